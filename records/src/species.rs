//! Species catalog: read-mostly reference data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::{Entity, Record, Repository};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`Species`].
pub type SpeciesRepository = Repository<Species>;

/// Broad grouping of ant species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum AntCategory {
    Carpenter,
    Harvester,
    Leafcutter,
    Fire,
    Pavement,
    Pharaoh,
    Acrobat,
    Field,
}

impl AntCategory {
    pub const ALL: [AntCategory; 8] = [
        AntCategory::Carpenter,
        AntCategory::Harvester,
        AntCategory::Leafcutter,
        AntCategory::Fire,
        AntCategory::Pavement,
        AntCategory::Pharaoh,
        AntCategory::Acrobat,
        AntCategory::Field,
    ];

    /// Stored and displayed name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AntCategory::Carpenter => "Carpenter",
            AntCategory::Harvester => "Harvester",
            AntCategory::Leafcutter => "Leafcutter",
            AntCategory::Fire => "Fire",
            AntCategory::Pavement => "Pavement",
            AntCategory::Pharaoh => "Pharaoh",
            AntCategory::Acrobat => "Acrobat",
            AntCategory::Field => "Field",
        }
    }
}

/// How demanding a species or guide is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// A catalog entry describing one ant species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: String,
    pub category: AntCategory,
    pub difficulty: DifficultyLevel,
    pub colony_size: String,
    pub temperature: String,
    pub humidity: String,
    pub feeding_info: String,
    pub nesting_info: String,
    pub description: String,
    pub image_system_name: String,
}

impl Species {
    /// Create a species with a fresh identifier and empty care facts.
    pub fn new(
        name: impl Into<String>,
        scientific_name: impl Into<String>,
        category: AntCategory,
        difficulty: DifficultyLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            scientific_name: scientific_name.into(),
            category,
            difficulty,
            colony_size: String::new(),
            temperature: String::new(),
            humidity: String::new(),
            feeding_info: String::new(),
            nesting_info: String::new(),
            description: String::new(),
            image_system_name: "ant".to_string(),
        }
    }

    /// Set the care facts shown in the catalog.
    pub fn with_care(
        mut self,
        colony_size: impl Into<String>,
        temperature: impl Into<String>,
        humidity: impl Into<String>,
        feeding_info: impl Into<String>,
        nesting_info: impl Into<String>,
    ) -> Self {
        self.colony_size = colony_size.into();
        self.temperature = temperature.into();
        self.humidity = humidity.into();
        self.feeding_info = feeding_info.into();
        self.nesting_info = nesting_info.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image_system_name: impl Into<String>) -> Self {
        self.image_system_name = image_system_name.into();
        self
    }

    fn matches(&self, needle: &str) -> bool {
        [
            self.name.as_str(),
            self.scientific_name.as_str(),
            self.category.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Entity for Species {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Species {
    const STORAGE_KEY: &'static str = "ant_species_data";

    fn defaults() -> Vec<Self> {
        vec![
            Species::new(
                "Carpenter Ant",
                "Camponotus",
                AntCategory::Carpenter,
                DifficultyLevel::Beginner,
            )
            .with_care(
                "10,000-50,000",
                "20-25°C",
                "50-70%",
                "Insects, honey, fruit",
                "Wood galleries, test tubes",
            )
            .with_description(
                "Large ants known for nesting in wood. Great for beginners due to their hardy nature.",
            )
            .with_image("ant.fill"),
            Species::new(
                "Harvester Ant",
                "Pogonomyrmex",
                AntCategory::Harvester,
                DifficultyLevel::Intermediate,
            )
            .with_care(
                "1,000-10,000",
                "25-30°C",
                "30-50%",
                "Seeds, grains, occasional insects",
                "Deep underground chambers",
            )
            .with_description(
                "Seed collecting ants with powerful mandibles. Require specific climate conditions.",
            ),
        ]
    }
}

impl Repository<Species> {
    /// Case-insensitive match on name, scientific name, or category.
    /// An empty query returns every species.
    pub fn search(&self, query: &str) -> Vec<&Species> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.all().iter().collect();
        }
        self.query(move |s| s.matches(&needle)).collect()
    }

    pub fn by_category(&self, category: AntCategory) -> Vec<&Species> {
        self.query(move |s| s.category == category).collect()
    }
}
