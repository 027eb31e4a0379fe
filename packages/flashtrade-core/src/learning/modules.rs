//! Built-in skill module catalog.

use crate::types::{Difficulty, ModuleType, SkillModule};
use std::sync::LazyLock;

fn module(
    id: &str,
    title: &str,
    content: &str,
    module_type: ModuleType,
    difficulty: Difficulty,
    estimated_minutes: u32,
    prerequisites: &[&str],
) -> SkillModule {
    SkillModule {
        module_id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        module_type,
        difficulty,
        estimated_minutes,
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        completion_rate: 0.0,
    }
}

/// Built-in skill modules, in curriculum order.
pub static SKILL_MODULES: LazyLock<Vec<SkillModule>> = LazyLock::new(|| {
    vec![
        module(
            "basics-001",
            "Flash Trading Fundamentals",
            "Learn the basics of flash trading and market dynamics.",
            ModuleType::Lesson,
            Difficulty::Beginner,
            5,
            &[],
        ),
        module(
            "risk-001",
            "Risk Management Essentials",
            "Understanding position sizing and stop-loss strategies.",
            ModuleType::Lesson,
            Difficulty::Beginner,
            8,
            &["basics-001"],
        ),
        module(
            "technical-001",
            "Technical Analysis Basics",
            "Reading charts and identifying trading opportunities.",
            ModuleType::Interactive,
            Difficulty::Intermediate,
            12,
            &["basics-001", "risk-001"],
        ),
        module(
            "psychology-001",
            "Trading Psychology",
            "Managing emotions and maintaining discipline.",
            ModuleType::Lesson,
            Difficulty::Intermediate,
            10,
            &["basics-001"],
        ),
        module(
            "advanced-001",
            "Advanced Flash Strategies",
            "Complex trading strategies and market timing.",
            ModuleType::Quiz,
            Difficulty::Advanced,
            15,
            &["technical-001", "psychology-001"],
        ),
    ]
});

/// List all skill modules.
pub fn list_modules() -> Vec<SkillModule> {
    SKILL_MODULES.clone()
}

/// Get a specific module by ID.
pub fn get_module(id: &str) -> Option<SkillModule> {
    SKILL_MODULES
        .iter()
        .find(|m| m.module_id.eq_ignore_ascii_case(id))
        .cloned()
}

/// Validate that a module exists.
pub fn is_valid_module(id: &str) -> bool {
    SKILL_MODULES
        .iter()
        .any(|m| m.module_id.eq_ignore_ascii_case(id))
}

/// Get all module IDs.
pub fn module_ids() -> Vec<String> {
    SKILL_MODULES.iter().map(|m| m.module_id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_modules() {
        let modules = list_modules();
        assert_eq!(modules.len(), 5);
        assert_eq!(modules[0].module_id, "basics-001");
    }

    #[test]
    fn test_get_module() {
        let technical = get_module("technical-001").unwrap();
        assert_eq!(technical.title, "Technical Analysis Basics");
        assert_eq!(technical.module_type, ModuleType::Interactive);
        assert_eq!(technical.prerequisites, vec!["basics-001", "risk-001"]);
    }

    #[test]
    fn test_get_module_case_insensitive() {
        assert!(get_module("RISK-001").is_some());
        assert!(get_module("nonexistent").is_none());
    }

    #[test]
    fn test_is_valid_module() {
        assert!(is_valid_module("advanced-001"));
        assert!(!is_valid_module("advanced-002"));
    }

    #[test]
    fn test_prerequisites_exist() {
        let ids = module_ids();
        for module in list_modules() {
            for prereq in &module.prerequisites {
                assert!(ids.contains(prereq), "{} missing", prereq);
            }
        }
    }
}
