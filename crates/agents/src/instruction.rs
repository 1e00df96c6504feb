//! Per-call system instruction composition.
//!
//! The instruction is derived fresh for every call from the agent's
//! immutable base instruction plus the request context. No shared
//! agent state is ever mutated, so concurrent requests against the
//! same pooled agent instance cannot leak another caller's
//! personalization.

use studymate_core::RequestContext;

/// Compose the system instruction for one call.
///
/// Appends personalization (display name, profile summary) and the
/// response-language directive to the agent's base instruction.
pub fn build_instruction(base: &str, language: &str, context: &RequestContext) -> String {
    let mut instruction = base.to_string();

    if let Some(name) = context.user_name() {
        instruction.push_str(&format!("\n\nThe user's name is {name}."));
    }

    if let Some(summary) = context.profile_summary() {
        instruction.push_str(&format!("\nUser profile: {summary}"));
    }

    let lang_name = match language {
        "es" => "Spanish",
        _ => "English",
    };
    instruction.push_str(&format!("\nAlways respond in {lang_name}."));

    instruction
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use studymate_core::context::{KEY_PROFILE_SUMMARY, KEY_USER_NAME};

    #[test]
    fn bare_context_only_adds_language() {
        let out = build_instruction("Base.", "en", &RequestContext::new());
        assert!(out.starts_with("Base."));
        assert!(out.contains("respond in English"));
        assert!(!out.contains("name is"));
    }

    #[test]
    fn personalization_is_appended() {
        let mut ctx = RequestContext::new();
        ctx.insert(KEY_USER_NAME, json!("Ana"));
        ctx.insert(KEY_PROFILE_SUMMARY, json!("CS student, beginner"));

        let out = build_instruction("Base.", "es", &ctx);
        assert!(out.contains("name is Ana"));
        assert!(out.contains("CS student"));
        assert!(out.contains("respond in Spanish"));
    }

    #[test]
    fn base_is_never_mutated() {
        let base = "Immutable base.";
        let mut ctx = RequestContext::new();
        ctx.insert(KEY_USER_NAME, json!("Luis"));
        let _ = build_instruction(base, "en", &ctx);
        // Two calls with different contexts stay independent.
        let plain = build_instruction(base, "en", &RequestContext::new());
        assert!(!plain.contains("Luis"));
    }
}
