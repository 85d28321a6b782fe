//! Check command implementation

use anyhow::Result;
use ks_core::Config;

use crate::cli::GlobalArgs;
use crate::commands::common::{self, ExitCode};

/// Execute the check command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = match common::load_config(global) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration is invalid: {:#}", e);
            return Err(ExitCode(2).into());
        }
    };

    let problems = problems(&config);
    print_settings(&config);
    println!();

    if problems.is_empty() {
        println!("Configuration OK");
        Ok(())
    } else {
        println!("{} problem(s):", problems.len());
        for problem in &problems {
            println!("  - {}", problem);
        }
        Err(ExitCode(1).into())
    }
}

/// Everything that would stop a sync from reaching the web app.
fn problems(config: &Config) -> Vec<String> {
    let mut problems: Vec<String> = config
        .missing_settings()
        .into_iter()
        .map(|var| format!("{} is not set", var))
        .collect();

    if let Err(e) = config.auth.secret() {
        problems.push(e.to_string());
    }
    problems
}

fn print_settings(config: &Config) {
    let or_unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());

    println!("web_app_url:   {}", or_unset(&config.web_app_url));
    println!(
        "spreadsheet:   {}",
        config
            .require_spreadsheet_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|_| "(unset)".to_string())
    );
    println!("update_mode:   {}", config.update_mode);
    println!("destinations:  {:?}", config.destinations.strategy);
    println!("auth:          {:?}", config.auth.kind);
    println!(
        "retry:         {} attempt(s), {}s base delay",
        config.retry.max_attempts, config.retry.base_delay_secs
    );
    match &config.quota {
        Some(quota) => println!(
            "quota:         {} request(s) per {}s",
            quota.max_requests, quota.window_secs
        ),
        None => println!("quota:         none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problems_lists_missing_endpoint() {
        let problems = problems(&Config::default());
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains(ks_core::config::ENV_WEB_APP_URL));
        assert!(problems[1].contains(ks_core::config::ENV_SHEET_ID));
    }

    #[test]
    fn test_problems_empty_when_configured() {
        let mut config = Config::default();
        config.override_endpoint(
            Some("https://script.example.com/exec".to_string()),
            Some("abc123".to_string()),
        );
        assert!(problems(&config).is_empty());
    }
}
