//! Equipment and supplies, owned or still needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::repository::{Entity, Record, Repository};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`InventoryItem`].
pub type InventoryRepository = Repository<InventoryItem>;

/// Window ahead of "now" in which a reminder counts as upcoming.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum ItemCategory {
    Housing,
    Feeding,
    Supplies,
    Tools,
    Maintenance,
    Safety,
}

/// An inventory entry. `quantity` and `cost` only mean something while
/// `is_owned` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: ItemCategory,
    pub is_owned: bool,
    pub quantity: u32,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl InventoryItem {
    /// An item still to be acquired.
    pub fn needed(name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            is_owned: false,
            quantity: 0,
            notes: String::new(),
            reminder_date: None,
            purchase_date: None,
            cost: None,
        }
    }

    /// An item already on hand.
    pub fn owned(
        name: impl Into<String>,
        category: ItemCategory,
        quantity: u32,
        purchase_date: Option<DateTime<Utc>>,
        cost: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if let Some(cost) = cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ValidationError::InvalidCost(cost));
            }
        }
        Ok(Self {
            is_owned: true,
            quantity,
            purchase_date,
            cost,
            ..Self::needed(name, category)
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_reminder(mut self, reminder_date: DateTime<Utc>) -> Self {
        self.reminder_date = Some(reminder_date);
        self
    }
}

impl Entity for InventoryItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for InventoryItem {
    const STORAGE_KEY: &'static str = "inventory_data";

    fn defaults() -> Vec<Self> {
        let now = Utc::now();
        let week_ago = Some(now - Duration::days(7));
        vec![
            InventoryItem {
                is_owned: true,
                quantity: 10,
                notes: "16x150mm size".to_string(),
                purchase_date: week_ago,
                cost: Some(15.99),
                ..InventoryItem::needed("Test Tubes", ItemCategory::Housing)
            },
            InventoryItem {
                is_owned: true,
                quantity: 50,
                notes: "Organic cotton".to_string(),
                purchase_date: week_ago,
                cost: Some(5.99),
                ..InventoryItem::needed("Cotton Balls", ItemCategory::Supplies)
            },
            InventoryItem::needed("Formicarium", ItemCategory::Housing)
                .with_notes("Need 20x15cm size")
                .with_reminder(now + Duration::days(7)),
        ]
    }
}

impl Repository<InventoryItem> {
    pub fn by_category(&self, category: ItemCategory) -> Vec<&InventoryItem> {
        self.query(move |i| i.category == category).collect()
    }

    pub fn owned(&self) -> Vec<&InventoryItem> {
        self.query(|i| i.is_owned).collect()
    }

    pub fn needed(&self) -> Vec<&InventoryItem> {
        self.query(|i| !i.is_owned).collect()
    }

    /// Items whose reminder falls within the next week, `now` included.
    pub fn upcoming_reminders(&self, now: DateTime<Utc>) -> Vec<&InventoryItem> {
        let horizon = now + Duration::days(REMINDER_WINDOW_DAYS);
        self.query(move |i| i.reminder_date.is_some_and(|d| d >= now && d <= horizon))
            .collect()
    }
}
