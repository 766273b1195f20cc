//! Multi-step input draft
//!
//! The wizard collects a [`ProjectInput`] over three steps. Navigation clamps
//! at both ends; edits go through [`ProjectInput::update`] so a rejected edit
//! never corrupts the draft.

use crate::error::ValidationError;
use crate::project::{ProjectInput, ProjectPatch};
use serde::{Deserialize, Serialize};

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    /// Project name and metal
    #[default]
    ProjectBasics,
    /// Material composition and energy source
    MaterialsAndEnergy,
    /// Transport and end-of-life
    LogisticsAndEndOfLife,
}

impl WizardStep {
    /// One-based step number
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::ProjectBasics => 1,
            WizardStep::MaterialsAndEnergy => 2,
            WizardStep::LogisticsAndEndOfLife => 3,
        }
    }

    /// Step title
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::ProjectBasics => "Project Basics",
            WizardStep::MaterialsAndEnergy => "Materials & Energy",
            WizardStep::LogisticsAndEndOfLife => "Logistics & End-of-Life",
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::ProjectBasics => WizardStep::MaterialsAndEnergy,
            WizardStep::MaterialsAndEnergy | WizardStep::LogisticsAndEndOfLife => {
                WizardStep::LogisticsAndEndOfLife
            }
        }
    }

    fn prev(self) -> Self {
        match self {
            WizardStep::ProjectBasics | WizardStep::MaterialsAndEnergy => WizardStep::ProjectBasics,
            WizardStep::LogisticsAndEndOfLife => WizardStep::MaterialsAndEnergy,
        }
    }
}

/// Draft input plus current step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    /// Draft being edited
    pub project: ProjectInput,
    /// Current step
    pub step: WizardStep,
}

impl Wizard {
    /// Fresh wizard with default input at step 1
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted draft
    #[inline]
    #[must_use]
    pub fn with_project(project: ProjectInput) -> Self {
        Self {
            project,
            step: WizardStep::default(),
        }
    }

    /// Advance one step, staying on the last step
    pub fn next(&mut self) -> WizardStep {
        self.step = self.step.next();
        self.step
    }

    /// Go back one step, staying on the first step
    pub fn prev(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.step
    }

    /// Merge an edit into the draft
    ///
    /// # Errors
    /// [`ValidationError`] from coercion; the draft is unchanged on failure.
    pub fn apply(&mut self, patch: ProjectPatch) -> Result<&ProjectInput, ValidationError> {
        self.project = self.project.update(patch)?;
        Ok(&self.project)
    }

    /// Restore defaults and step 1
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the draft is on the submission step
    #[inline]
    #[must_use]
    pub fn is_final_step(&self) -> bool {
        self.step == WizardStep::LogisticsAndEndOfLife
    }

    /// Whether enough has been entered for quick tips to be useful
    #[inline]
    #[must_use]
    pub fn tips_ready(&self) -> bool {
        !self.project.project_name.trim().is_empty()
    }
}
