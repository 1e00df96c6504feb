//! `studymate chat` — Interactive or single-message chat mode.

use serde_json::json;
use std::sync::Arc;
use studymate_agents::default_agents;
use studymate_backends::{BackendPool, build_from_config};
use studymate_config::AppConfig;
use studymate_core::context::{KEY_CALLER_ID, KEY_USER_NAME};
use studymate_core::{ChatMessage, Profile, ReasoningBackend, RequestContext};
use studymate_orchestrator::{Orchestrator, RequestOptions, ResponseCache};
use studymate_router::RouterAgent;
use studymate_tools::{InMemoryStore, default_registry};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    language: Option<String>,
    name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.backend.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    STUDYMATE_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY    = 'sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to ~/.studymate/config.toml");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let language = language.unwrap_or_else(|| config.default_language.clone());
    let engine = build_engine(&config)?;

    let mut context = RequestContext::new();
    context.insert(KEY_CALLER_ID, json!("cli"));
    if let Some(name) = &name {
        context.insert(KEY_USER_NAME, json!(name));
    }

    if let Some(msg) = message {
        // Single message mode
        let options = RequestOptions::new()
            .with_language(&language)
            .with_context(context);

        eprint!("  Thinking...");
        let outcome = engine.process_message(&msg, options).await;
        eprint!("\r              \r");
        println!("{}", outcome.response.content);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  StudyMate — Interactive Mode");
    println!("  Language: {language}");
    println!("  Agents:   learning, task, code, roadmap, general");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut history: Vec<ChatMessage> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            print_prompt()?;
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let options = RequestOptions::new()
            .with_history(history.clone())
            .with_language(&language)
            .with_context(context.clone());

        eprint!("  ...");
        let outcome = engine.process_message(input, options).await;
        eprint!("\r     \r");

        println!();
        for line in outcome.response.content.lines() {
            println!("  [{}] > {line}", outcome.routed_to);
        }
        println!();

        history.push(ChatMessage::user(input));
        history.push(ChatMessage::assistant(&outcome.response.content));

        print_prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn print_prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}

/// Wire the full engine from configuration: backend pool, stores,
/// tools, agents, router, cache.
fn build_engine(config: &AppConfig) -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let pool: BackendPool = build_from_config(config);
    let fast = pool
        .get(Profile::Fast)
        .ok_or("No backend configured for the fast profile")?;

    let store = Arc::new(InMemoryStore::new());
    let tools = Arc::new(default_registry(store.clone(), store));

    let backend_for = |profile: Profile| -> Arc<dyn ReasoningBackend> {
        pool.get(profile).unwrap_or_else(|| fast.clone())
    };
    let agents = default_agents(backend_for, tools);

    let router = RouterAgent::new(fast.clone());
    let cache = ResponseCache::new(&config.cache);

    Ok(Orchestrator::new(router, agents, cache)
        .with_default_language(config.default_language.clone()))
}
