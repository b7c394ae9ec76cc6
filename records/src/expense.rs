//! Hobby expenses.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::repository::{Entity, Record, Repository};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`Expense`].
pub type ExpenseRepository = Repository<Expense>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum ExpenseCategory {
    Equipment,
    Food,
    Housing,
    Maintenance,
    #[serde(rename = "Books & Education")]
    Books,
    Other,
}

/// A single purchase or cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub description: String,
    pub category: ExpenseCategory,
    pub date: DateTime<Utc>,
    pub notes: String,
}

impl Expense {
    /// Create an expense. `amount` must be finite and not negative.
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: ExpenseCategory,
        date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            description: description.into(),
            category,
            date,
            notes: String::new(),
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

impl Entity for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Expense {
    const STORAGE_KEY: &'static str = "expenses_data";

    fn defaults() -> Vec<Self> {
        let now = Utc::now();
        vec![
            Expense {
                id: Uuid::new_v4(),
                amount: 25.99,
                description: "Test Tube Setup Kit".to_string(),
                category: ExpenseCategory::Equipment,
                date: now - Duration::days(3),
                notes: "Initial setup for first colony".to_string(),
            },
            Expense {
                id: Uuid::new_v4(),
                amount: 8.50,
                description: "Honey and Crickets".to_string(),
                category: ExpenseCategory::Food,
                date: now - Duration::days(1),
                notes: "Weekly feeding supplies".to_string(),
            },
        ]
    }
}

/// First instant of the calendar month containing `now` (UTC).
fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

impl Repository<Expense> {
    pub fn total(&self) -> f64 {
        self.all().iter().map(|e| e.amount).sum()
    }

    pub fn by_category(&self, category: ExpenseCategory) -> Vec<&Expense> {
        self.query(move |e| e.category == category).collect()
    }

    /// Sum of expenses dated on or after the first of `now`'s month.
    pub fn monthly_total(&self, now: DateTime<Utc>) -> f64 {
        let start = start_of_month(now);
        self.query(move |e| e.date >= start).map(|e| e.amount).sum()
    }

    /// Expenses dated within `[start, end]`.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Expense> {
        self.query(move |e| e.date >= start && e.date <= end).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BlobStore, MemoryStore};
    use std::sync::Arc;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
    }

    fn ledger() -> ExpenseRepository {
        let store = Arc::new(MemoryStore::new());
        store.set("expenses_data", b"[]").unwrap();
        let mut repo = ExpenseRepository::open(store);
        for (amount, category, date) in [
            (10.0, ExpenseCategory::Food, at(2, 28)),
            (20.0, ExpenseCategory::Equipment, at(3, 1)),
            (5.5, ExpenseCategory::Food, at(3, 15)),
        ] {
            repo.add(Expense::new(amount, "item", category, date).unwrap());
        }
        repo
    }

    #[test]
    fn test_totals() {
        let repo = ledger();
        assert_eq!(repo.total(), 35.5);
        assert_eq!(repo.monthly_total(at(3, 20)), 25.5);
        assert_eq!(repo.by_category(ExpenseCategory::Food).len(), 2);
    }

    #[test]
    fn test_range_is_inclusive() {
        let repo = ledger();
        assert_eq!(repo.in_range(at(2, 28), at(3, 1)).len(), 2);
        assert!(repo.in_range(at(4, 1), at(4, 30)).is_empty());
    }

    #[test]
    fn test_rejects_negative_amount() {
        assert_eq!(
            Expense::new(-1.0, "refund", ExpenseCategory::Other, at(1, 1)),
            Err(ValidationError::InvalidAmount(-1.0))
        );
        assert!(Expense::new(f64::NAN, "?", ExpenseCategory::Other, at(1, 1)).is_err());
    }

    #[test]
    fn test_books_raw_value() {
        let json = serde_json::to_string(&ExpenseCategory::Books).unwrap();
        assert_eq!(json, r#""Books & Education""#);
    }
}
