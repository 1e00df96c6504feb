//! Fast heuristic classifier — the zero-latency routing path.
//!
//! Applies ordered, case-insensitive keyword groups to the raw message
//! and returns the first matching agent. Pure function, no failure
//! mode. Vocabulary covers English and Spanish since the assistant
//! serves both.

use studymate_core::AgentId;

/// One keyword group mapped to an agent. Groups are checked in order;
/// the first hit wins.
struct KeywordGroup {
    agent: AgentId,
    keywords: &'static [&'static str],
}

/// Group order matters: task-deadline vocabulary is checked before the
/// learning vocabulary so "remind me to study" routes to tasks.
const GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        agent: AgentId::Task,
        keywords: &[
            "deadline",
            "due date",
            "remind me",
            "reminder",
            "pending task",
            "my tasks",
            "to-do",
            "todo list",
            "fecha límite",
            "fecha limite",
            "recuérdame",
            "recuerdame",
            "recordatorio",
            "mis tareas",
            "tareas pendientes",
        ],
    },
    KeywordGroup {
        agent: AgentId::Learning,
        keywords: &[
            "study plan",
            "learning plan",
            "learning path",
            "course plan",
            "what should i learn",
            "teach me",
            "plan de estudio",
            "ruta de aprendizaje",
            "quiero aprender",
            "enséñame",
            "enseñame",
        ],
    },
    KeywordGroup {
        agent: AgentId::Code,
        keywords: &[
            "debug",
            "stack trace",
            "compile error",
            "syntax error",
            "my code",
            "this function",
            "exception",
            "no compila",
            "mi código",
            "mi codigo",
            "este error",
            "depurar",
        ],
    },
    KeywordGroup {
        agent: AgentId::General,
        keywords: &[
            "what is",
            "what does",
            "explain",
            "difference between",
            "qué es",
            "que es",
            "explícame",
            "explicame",
            "qué significa",
            "que significa",
        ],
    },
    KeywordGroup {
        agent: AgentId::Roadmap,
        keywords: &[
            "where do i find",
            "how do i open",
            "where is the",
            "which section",
            "navigate to",
            "dónde encuentro",
            "donde encuentro",
            "cómo abro",
            "como abro",
            "qué sección",
            "que seccion",
        ],
    },
];

/// Classify a message by keyword match.
///
/// Returns the first matching agent, or `None` when no group matches
/// and the LLM router should decide.
pub fn fast_route(message: &str) -> Option<AgentId> {
    let lowered = message.to_lowercase();
    for group in GROUPS {
        if group.keywords.iter().any(|k| lowered.contains(k)) {
            return Some(group.agent);
        }
    }
    None
}
