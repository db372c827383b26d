//! Prompt templates sent to the generative-language provider.

use shared::domain::{BehaviorCategory, StudentLevel};

pub const STRATEGY_LIBRARY_PROMPT: &str =
    "Generate a list of 5 diverse tutoring strategies for managing common difficult classroom behaviors.";

pub fn advice_prompt(scenario: &str, category: BehaviorCategory) -> String {
    format!(
        "As an expert educational psychologist and senior tutor mentor, provide actionable advice \
         for the following situation involving {category}: \"{scenario}\". \
         Focus on de-escalation, positive reinforcement, and underlying causes. \
         Format your response clearly with headings."
    )
}

/// System directive fixing the persona for one simulation session.
pub fn persona_directive(category: BehaviorCategory, level: StudentLevel) -> String {
    format!(
        "You are a student named Alex during a tutoring session. You are exhibiting {category}. \
         Your age level is {level}. Be realistic, not overly aggressive, but represent the \
         challenges a tutor might face with {category}. Do not break character. Respond to the \
         tutor's attempts to help or redirect you."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_prompt_embeds_scenario_and_category() {
        let prompt = advice_prompt("refuses the math worksheet", BehaviorCategory::Frustration);
        assert!(prompt.contains("refuses the math worksheet"));
        assert!(prompt.contains("Frustration"));
    }

    #[test]
    fn persona_directive_fixes_name_category_and_level() {
        let directive = persona_directive(BehaviorCategory::Impulsivity, StudentLevel::Middle);
        assert!(directive.contains("Alex"));
        assert!(directive.contains("Impulsivity"));
        assert!(directive.contains("Middle School"));
        assert!(directive.contains("Do not break character"));
    }
}
