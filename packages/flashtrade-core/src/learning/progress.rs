//! Which modules a learner has finished and what is unlocked.

use super::modules::{get_module, SKILL_MODULES};
use crate::types::SkillModule;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Display state of a module for one learner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Completed,
    InProgress,
    Locked,
}

/// Set of completed module IDs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LearningProgress {
    completed: BTreeSet<String>,
}

impl LearningProgress {
    /// Create progress with nothing completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed module IDs.
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.completed.iter().map(String::as_str)
    }

    /// Whether a module has been completed.
    pub fn is_completed(&self, module_id: &str) -> bool {
        self.completed.contains(module_id)
    }

    /// Completed, available (all prerequisites done) or locked.
    pub fn module_state(&self, module: &SkillModule) -> ModuleState {
        if self.is_completed(&module.module_id) {
            ModuleState::Completed
        } else if module.prerequisites.iter().all(|p| self.is_completed(p)) {
            ModuleState::InProgress
        } else {
            ModuleState::Locked
        }
    }

    /// Mark a module completed. Completing it twice is a no-op.
    ///
    /// Locked modules cannot be completed.
    pub fn complete(&mut self, module_id: &str) -> Result<ModuleState> {
        let module =
            get_module(module_id).ok_or_else(|| Error::UnknownModule(module_id.to_string()))?;

        match self.module_state(&module) {
            ModuleState::Locked => Err(Error::InvalidOperation(format!(
                "Module {} is locked until its prerequisites are completed",
                module.module_id
            ))),
            ModuleState::Completed => Ok(ModuleState::Completed),
            ModuleState::InProgress => {
                tracing::info!("Completed module {}", module.module_id);
                self.completed.insert(module.module_id);
                Ok(ModuleState::Completed)
            }
        }
    }

    /// Share of the catalog completed, as a percentage.
    pub fn progress_percent(&self) -> f64 {
        let total = SKILL_MODULES.len();
        if total == 0 {
            return 0.0;
        }
        let done = SKILL_MODULES
            .iter()
            .filter(|m| self.is_completed(&m.module_id))
            .count();
        (done as f64 / total as f64) * 100.0
    }
}
