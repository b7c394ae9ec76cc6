//! Colonies and their activity logs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::{Entity, Record, Repository};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`Colony`].
pub type ColonyRepository = Repository<Colony>;

/// Kind of activity recorded against a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum LogActivity {
    Feeding,
    Cleaning,
    Observation,
    Breeding,
    Maintenance,
    Medical,
}

/// One entry in a colony's activity log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ColonyLog {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub activity: LogActivity,
    pub notes: String,
}

impl ColonyLog {
    pub fn new(date: DateTime<Utc>, activity: LogActivity, notes: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            activity,
            notes: notes.into(),
        }
    }
}

/// Population counts of a colony.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub queens: u32,
    pub workers: u32,
    pub larvae: u32,
    pub pupae: u32,
    pub eggs: u32,
}

/// A colony owned by the keeper.
///
/// `last_fed` and `last_cleaned` are maintained by [`Colony::record_log`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Colony {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub founded_date: DateTime<Utc>,
    pub queen_count: u32,
    pub worker_count: u32,
    pub larvae: u32,
    pub pupae: u32,
    pub eggs: u32,
    pub notes: String,
    pub logs: Vec<ColonyLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cleaned: Option<DateTime<Utc>>,
    pub temperature_range: String,
    pub humidity_range: String,
}

impl Colony {
    pub fn new(
        name: impl Into<String>,
        species: impl Into<String>,
        founded_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            species: species.into(),
            founded_date,
            queen_count: 0,
            worker_count: 0,
            larvae: 0,
            pupae: 0,
            eggs: 0,
            notes: String::new(),
            logs: Vec::new(),
            last_fed: None,
            last_cleaned: None,
            temperature_range: String::new(),
            humidity_range: String::new(),
        }
    }

    pub fn with_census(mut self, census: Census) -> Self {
        self.queen_count = census.queens;
        self.worker_count = census.workers;
        self.larvae = census.larvae;
        self.pupae = census.pupae;
        self.eggs = census.eggs;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_climate(
        mut self,
        temperature_range: impl Into<String>,
        humidity_range: impl Into<String>,
    ) -> Self {
        self.temperature_range = temperature_range.into();
        self.humidity_range = humidity_range.into();
        self
    }

    pub fn census(&self) -> Census {
        Census {
            queens: self.queen_count,
            workers: self.worker_count,
            larvae: self.larvae,
            pupae: self.pupae,
            eggs: self.eggs,
        }
    }

    /// Append `log` and update the activity timestamps.
    ///
    /// A feeding log sets `last_fed` and a cleaning log sets `last_cleaned` to
    /// the log's date, even when that date is older than the current value:
    /// the most recently appended log wins, not the latest date.
    pub fn record_log(&mut self, log: ColonyLog) {
        match log.activity {
            LogActivity::Feeding => self.last_fed = Some(log.date),
            LogActivity::Cleaning => self.last_cleaned = Some(log.date),
            _ => {}
        }
        self.logs.push(log);
    }
}

impl Entity for Colony {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Colony {
    const STORAGE_KEY: &'static str = "colonies_data";

    fn defaults() -> Vec<Self> {
        let now = Utc::now();
        let mut alpha = Colony::new("Colony Alpha", "Camponotus", now - Duration::days(30))
            .with_census(Census {
                queens: 1,
                workers: 15,
                larvae: 8,
                pupae: 5,
                eggs: 12,
            })
            .with_notes("First colony, doing well")
            .with_climate("22-25°C", "60-70%");
        alpha.logs.push(ColonyLog::new(
            now,
            LogActivity::Feeding,
            "Fed honey and crickets",
        ));
        alpha.last_fed = Some(now - Duration::days(1));
        alpha.last_cleaned = Some(now - Duration::days(3));
        vec![alpha]
    }
}

impl Repository<Colony> {
    /// Append `log` to the colony `colony_id` as one replacement write.
    ///
    /// Returns `false` without writing when the colony does not exist.
    pub fn add_log(&mut self, colony_id: Uuid, log: ColonyLog) -> bool {
        self.replace_with(colony_id, |colony| {
            colony.record_log(log);
            true
        })
    }

    /// Logs of one colony, oldest first.
    pub fn logs(&self, colony_id: Uuid) -> &[ColonyLog] {
        self.get(colony_id).map(|c| c.logs.as_slice()).unwrap_or(&[])
    }
}
