//! Records - persistent collections for an ant keeper
//!
//! Six collections share one generic [`Repository`]: each owns its entities
//! in memory and rewrites one storage slot on every change.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ SpeciesRepository  ColonyRepository   ...     │
//! │ (type aliases + domain queries)               │
//! └────────────────────┬─────────────────────────┘
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │ Repository<T, C>                              │
//! │ load / add / update / delete / query          │
//! └──────────┬─────────────────────┬─────────────┘
//!            ▼                     ▼
//!    ┌───────────────┐     ┌───────────────┐
//!    │ EntityCodec   │     │ BlobStore     │
//!    │ (JSON array)  │     │ (memory/file) │
//!    └───────────────┘     └───────────────┘
//! ```

pub mod calculator;
pub mod codec;
pub mod colony;
pub mod error;
pub mod expense;
pub mod favorites;
pub mod guide;
pub mod inventory;
pub mod repository;
pub mod species;
pub mod store;

pub use codec::{EntityCodec, JsonCodec};
pub use colony::{Census, Colony, ColonyLog, ColonyRepository, LogActivity};
pub use error::{CodecError, RepositoryError, StoreError, ValidationError};
pub use expense::{Expense, ExpenseCategory, ExpenseRepository};
pub use favorites::{FavoriteItem, FavoriteType, FavoritesRepository};
pub use guide::{GuideCategory, SetupGuide, SetupGuideRepository, SetupStep};
pub use inventory::{InventoryItem, InventoryRepository, ItemCategory};
pub use repository::{Entity, LoadOrigin, Record, Repository, RepositorySlot};
pub use species::{AntCategory, DifficultyLevel, Species, SpeciesRepository};
pub use store::{BlobStore, FileStore, MemoryStore};
