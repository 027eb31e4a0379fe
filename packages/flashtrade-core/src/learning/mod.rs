//! Skill modules and learner progress.

mod modules;
mod progress;

pub use modules::{get_module, is_valid_module, list_modules, module_ids, SKILL_MODULES};
pub use progress::{LearningProgress, ModuleState};
