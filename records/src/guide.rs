//! Setup guides with step-by-step progress tracking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::{Entity, Record, Repository};
use crate::species::DifficultyLevel;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Repository of [`SetupGuide`].
pub type SetupGuideRepository = Repository<SetupGuide>;

const GENERATED_STEPS: [&str; 8] = [
    "Prepare a suitable formicarium or test tube setup",
    "Ensure proper temperature (75-80°F) and humidity (50-60%)",
    "Add a small water source and feeding area",
    "Introduce the queen ant carefully to the setup",
    "Monitor daily for signs of egg laying",
    "Maintain consistent environmental conditions",
    "Wait for first workers to emerge (4-8 weeks)",
    "Gradually expand the colony space as needed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum GuideCategory {
    Beginner,
    Housing,
    Feeding,
    Breeding,
    Maintenance,
}

/// One step of a guide, identified within its parent guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SetupStep {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub image_system_name: String,
}

impl SetupStep {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image_system_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            is_completed: false,
            image_system_name: image_system_name.into(),
        }
    }
}

/// A guide made of ordered steps.
///
/// `progress` and `is_completed` are stored, but always recomputed from the
/// steps by [`SetupGuide::refresh_progress`] before the guide is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SetupGuide {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub steps: Vec<SetupStep>,
    pub category: GuideCategory,
    pub estimated_time: String,
    pub difficulty: DifficultyLevel,
    pub progress: f64,
    pub is_completed: bool,
}

impl SetupGuide {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<SetupStep>,
        category: GuideCategory,
        estimated_time: impl Into<String>,
        difficulty: DifficultyLevel,
    ) -> Self {
        let mut guide = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            steps,
            category,
            estimated_time: estimated_time.into(),
            difficulty,
            progress: 0.0,
            is_completed: false,
        };
        guide.refresh_progress();
        guide
    }

    /// Templated guide for a free-text request. Blank prompts yield `None`.
    pub fn from_prompt(prompt: &str) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        let steps = GENERATED_STEPS
            .iter()
            .map(|title| SetupStep::new(*title, "Follow this step carefully", "checkmark.circle"))
            .collect();
        Some(Self::new(
            format!("AI Generated: {prompt}"),
            "Step-by-step guide generated based on your specific requirements for ant colony setup.",
            steps,
            GuideCategory::Housing,
            "2-3 hours setup, 6-10 weeks for development",
            DifficultyLevel::Intermediate,
        ))
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.is_completed).count()
    }

    /// Recompute `progress` and `is_completed` from the steps.
    ///
    /// A guide without steps has zero progress and is never complete.
    pub fn refresh_progress(&mut self) {
        let total = self.steps.len();
        let completed = self.completed_steps();
        if total == 0 {
            self.progress = 0.0;
            self.is_completed = false;
        } else {
            self.progress = completed as f64 / total as f64;
            self.is_completed = completed == total;
        }
    }

    /// Set one step's completion and refresh progress.
    ///
    /// Returns `false` when the guide has no step `step_id`.
    pub fn set_step_completion(&mut self, step_id: Uuid, completed: bool) -> bool {
        let Some(step) = self.steps.iter_mut().find(|s| s.id == step_id) else {
            return false;
        };
        step.is_completed = completed;
        self.refresh_progress();
        true
    }
}

impl Entity for SetupGuide {
    fn id(&self) -> Uuid {
        self.id
    }

    fn refresh_derived(&mut self) {
        self.refresh_progress();
    }
}

impl Record for SetupGuide {
    const STORAGE_KEY: &'static str = "setup_guides_data";

    fn defaults() -> Vec<Self> {
        vec![SetupGuide::new(
            "First Colony Setup",
            "Complete guide for setting up your first ant colony",
            vec![
                SetupStep::new(
                    "Prepare Test Tube",
                    "Fill test tube with water and cotton ball",
                    "testtube.2",
                ),
                SetupStep::new(
                    "Add Queen",
                    "Carefully place queen ant in test tube setup",
                    "ant.fill",
                ),
                SetupStep::new(
                    "Create Dark Environment",
                    "Cover test tube with aluminum foil",
                    "moon.fill",
                ),
            ],
            GuideCategory::Beginner,
            "30 minutes",
            DifficultyLevel::Beginner,
        )]
    }
}

impl Repository<SetupGuide> {
    /// Toggle one step of a guide. The step change and the progress
    /// recompute land in the same replacement value and a single write.
    ///
    /// Returns `false` without writing when the guide or step is unknown.
    pub fn set_step_completion(&mut self, guide_id: Uuid, step_id: Uuid, completed: bool) -> bool {
        self.replace_with(guide_id, |guide| guide.set_step_completion(step_id, completed))
    }

    /// Add a templated guide for `prompt` and return its identifier.
    pub fn generate_from_prompt(&mut self, prompt: &str) -> Option<Uuid> {
        let guide = SetupGuide::from_prompt(prompt)?;
        let id = guide.id;
        self.add(guide);
        Some(id)
    }

    pub fn by_category(&self, category: GuideCategory) -> Vec<&SetupGuide> {
        self.query(move |g| g.category == category).collect()
    }

    pub fn completed(&self) -> Vec<&SetupGuide> {
        self.query(|g| g.is_completed).collect()
    }
}
