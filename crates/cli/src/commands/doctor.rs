//! `studymate doctor` — Diagnose configuration and backend health.

use studymate_backends::build_from_config;
use studymate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("StudyMate Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Config loaded");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!();
            println!("  1 issue found. Fix the config and rerun.");
            return Ok(());
        }
    };

    if config.backend.api_key.is_some() {
        println!("  [ok]   API key configured");
    } else {
        println!("  [warn] No API key — set STUDYMATE_API_KEY or OPENAI_API_KEY");
        issues += 1;
    }

    for (name, profile) in &config.backend.profiles {
        println!("  [ok]   Profile '{name}' -> {}", profile.model);
    }

    if config.backend.api_key.is_some() {
        let pool = build_from_config(&config);
        if pool.health_check().await {
            println!("  [ok]   Backend reachable at {}", config.backend.base_url);
        } else {
            println!("  [fail] Backend unreachable at {}", config.backend.base_url);
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
