//! The six record collections opened over one store.

use std::sync::Arc;

use records::{
    BlobStore, ColonyRepository, ExpenseRepository, FavoritesRepository, FileStore,
    InventoryRepository, RepositoryError, SetupGuideRepository, SpeciesRepository, StoreError,
};
use tracing::info;

pub struct Session {
    pub species: SpeciesRepository,
    pub colonies: ColonyRepository,
    pub expenses: ExpenseRepository,
    pub inventory: InventoryRepository,
    pub guides: SetupGuideRepository,
    pub favorites: FavoritesRepository,
}

impl Session {
    pub fn open(store: Arc<dyn BlobStore>) -> Self {
        Self {
            species: SpeciesRepository::open(store.clone()),
            colonies: ColonyRepository::open(store.clone()),
            expenses: ExpenseRepository::open(store.clone()),
            inventory: InventoryRepository::open(store.clone()),
            guides: SetupGuideRepository::open(store.clone()),
            favorites: FavoritesRepository::open(store),
        }
    }

    /// Open every collection under `data_dir`.
    pub fn open_dir(data_dir: &std::path::Path) -> Result<Self, StoreError> {
        let store = FileStore::open(data_dir)?;
        info!(data_dir = %data_dir.display(), "Opened record store");
        Ok(Self::open(Arc::new(store)))
    }

    /// Failed reads and writes still pending across all collections.
    pub fn storage_errors(&self) -> Vec<&RepositoryError> {
        [
            self.species.last_load_error(),
            self.species.last_persist_error(),
            self.colonies.last_load_error(),
            self.colonies.last_persist_error(),
            self.expenses.last_load_error(),
            self.expenses.last_persist_error(),
            self.inventory.last_load_error(),
            self.inventory.last_persist_error(),
            self.guides.last_load_error(),
            self.guides.last_persist_error(),
            self.favorites.last_load_error(),
            self.favorites.last_persist_error(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
