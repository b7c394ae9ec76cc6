//! Material calculators for setting up and feeding a colony.
//!
//! Pure functions; results can be kept as `Calculation` favorites.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

const CUBIC_CM_PER_CUP: f64 = 236.6;
const CUBIC_IN_PER_CUP: f64 = 14.4;
const ML_PER_CUBIC_IN: f64 = 16.39;

const SUGAR_AMOUNT: &str = "2-3 drops of honey water";
const FEEDING_NOTE: &str = "Adjust amounts based on colony activity and season. \
Remove uneaten food after 24-48 hours to prevent mold.";

/// Substrate portions in cups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SubstrateMix {
    pub sand_cups: f64,
    pub clay_cups: f64,
    pub soil_cups: f64,
    /// Sum of the three percentages; a usable mix adds up to 100.
    pub percent_total: f64,
}

impl SubstrateMix {
    pub fn is_balanced(&self) -> bool {
        (self.percent_total - 100.0).abs() < 1e-9
    }
}

/// Split `total_cups` of substrate by percentage.
pub fn substrate(total_cups: f64, sand_pct: f64, clay_pct: f64, soil_pct: f64) -> SubstrateMix {
    SubstrateMix {
        sand_cups: total_cups * sand_pct / 100.0,
        clay_cups: total_cups * clay_pct / 100.0,
        soil_cups: total_cups * soil_pct / 100.0,
        percent_total: sand_pct + clay_pct + soil_pct,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum VolumeUnit {
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "in")]
    Inches,
}

impl VolumeUnit {
    /// Cubic unit label.
    pub fn cubic_label(&self) -> &'static str {
        match self {
            VolumeUnit::Centimeters => "cm³",
            VolumeUnit::Inches => "in³",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct VolumeEstimate {
    pub volume: f64,
    pub unit: VolumeUnit,
    pub substrate_cups: f64,
    pub water_ml: f64,
}

/// Volume of an enclosure and the substrate and water it holds.
///
/// Returns `None` if any dimension is negative or not finite.
pub fn volume(length: f64, width: f64, height: f64, unit: VolumeUnit) -> Option<VolumeEstimate> {
    if [length, width, height]
        .iter()
        .any(|d| !d.is_finite() || *d < 0.0)
    {
        return None;
    }
    let volume = length * width * height;
    let (substrate_cups, water_ml) = match unit {
        VolumeUnit::Centimeters => (volume / CUBIC_CM_PER_CUP, volume),
        VolumeUnit::Inches => (volume / CUBIC_IN_PER_CUP, volume * ML_PER_CUBIC_IN),
    };
    Some(VolumeEstimate {
        volume,
        unit,
        substrate_cups,
        water_ml,
    })
}

/// Worker body size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum AntSize {
    Small,
    Medium,
    Large,
}

impl AntSize {
    /// Protein items per worker per feeding.
    pub fn protein_multiplier(&self) -> f64 {
        match self {
            AntSize::Small => 0.01,
            AntSize::Medium => 0.02,
            AntSize::Large => 0.03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum FeedingFrequency {
    Daily,
    #[serde(rename = "Twice weekly")]
    TwiceWeekly,
    Weekly,
    #[serde(rename = "Bi-weekly")]
    Biweekly,
}

impl FeedingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedingFrequency::Daily => "Daily",
            FeedingFrequency::TwiceWeekly => "Twice weekly",
            FeedingFrequency::Weekly => "Weekly",
            FeedingFrequency::Biweekly => "Bi-weekly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FeedingPlan {
    pub protein_count: u32,
    pub protein_amount: String,
    pub sugar_amount: String,
    pub frequency: FeedingFrequency,
    pub notes: String,
}

/// Feeding amounts for a colony of `colony_size` workers.
pub fn feeding(colony_size: u32, ant_size: AntSize, frequency: FeedingFrequency) -> FeedingPlan {
    let protein_count = (f64::from(colony_size) * ant_size.protein_multiplier()).floor() as u32;
    FeedingPlan {
        protein_count,
        protein_amount: format!("{protein_count} small insects or 1-2 larger insects"),
        sugar_amount: SUGAR_AMOUNT.to_string(),
        frequency,
        notes: FEEDING_NOTE.to_string(),
    }
}
