//! Favorites: weak references to records held in other repositories.
//!
//! A favorite names its target by `(reference_id, kind)` only. Nothing here
//! checks that the target exists, and removing the target elsewhere leaves
//! the favorite in place. Resolve a favorite with an explicit `get` on the
//! target repository, which may return `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::guide::SetupGuide;
use crate::repository::{Entity, Record, Repository};
use crate::species::Species;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`FavoriteItem`].
pub type FavoritesRepository = Repository<FavoriteItem>;

/// Number of entries returned by [`Repository::recent`].
pub const RECENT_LIMIT: usize = 10;

/// Characters of an answer kept as an advice favorite's description.
const ADVICE_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum FavoriteType {
    Species,
    Guide,
    Calculation,
    #[serde(rename = "AI Advice")]
    Advice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: FavoriteType,
    pub title: String,
    pub description: String,
    pub date_added: DateTime<Utc>,
    pub reference_id: String,
}

impl FavoriteItem {
    pub fn new(
        kind: FavoriteType,
        title: impl Into<String>,
        description: impl Into<String>,
        reference_id: impl Into<String>,
        date_added: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: description.into(),
            date_added,
            reference_id: reference_id.into(),
        }
    }

    /// Favorite for an advisory answer; the description is the first 100
    /// characters of the answer.
    pub fn advice(answer: &str, reference_id: Uuid, now: DateTime<Utc>) -> Self {
        let preview: String = answer.chars().take(ADVICE_PREVIEW_CHARS).collect();
        Self::new(
            FavoriteType::Advice,
            "AI Advice",
            preview,
            reference_id.to_string(),
            now,
        )
    }

    pub fn for_species(species: &Species, now: DateTime<Utc>) -> Self {
        Self::new(
            FavoriteType::Species,
            species.name.clone(),
            species.scientific_name.clone(),
            species.id.to_string(),
            now,
        )
    }

    pub fn for_guide(guide: &SetupGuide, now: DateTime<Utc>) -> Self {
        Self::new(
            FavoriteType::Guide,
            guide.title.clone(),
            guide.description.clone(),
            guide.id.to_string(),
            now,
        )
    }

    /// Favorite for a calculator result. Calculations have no stored record,
    /// so the reference is a fresh identifier.
    pub fn calculation(
        title: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            FavoriteType::Calculation,
            title,
            description,
            Uuid::new_v4().to_string(),
            now,
        )
    }

    /// Target identifier parsed as a UUID, for lookup in the target repository.
    pub fn reference_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.reference_id).ok()
    }

    fn refers_to(&self, reference_id: &str, kind: FavoriteType) -> bool {
        self.kind == kind && self.reference_id == reference_id
    }
}

impl Entity for FavoriteItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for FavoriteItem {
    const STORAGE_KEY: &'static str = "favorites_data";

    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}

impl Repository<FavoriteItem> {
    /// Remove the favorite `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        self.delete(id) > 0
    }

    /// Whether any favorite has exactly this `(reference_id, kind)` pair.
    pub fn is_favorited(&self, reference_id: &str, kind: FavoriteType) -> bool {
        self.find_reference(reference_id, kind).is_some()
    }

    /// First favorite with this `(reference_id, kind)` pair.
    pub fn find_reference(&self, reference_id: &str, kind: FavoriteType) -> Option<&FavoriteItem> {
        self.query(move |f| f.refers_to(reference_id, kind)).next()
    }

    pub fn by_type(&self, kind: FavoriteType) -> Vec<&FavoriteItem> {
        self.query(move |f| f.kind == kind).collect()
    }

    /// The ten most recently added favorites, newest first.
    pub fn recent(&self) -> Vec<&FavoriteItem> {
        let mut items: Vec<_> = self.all().iter().collect();
        items.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        items.truncate(RECENT_LIMIT);
        items
    }

    /// Remove every favorite with a single write.
    pub fn clear(&mut self) -> usize {
        self.retain(|_| false)
    }
}
