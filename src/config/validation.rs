use std::collections::HashSet;

use tracing_subscriber::EnvFilter;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref level) = config.log_level {
        if let Err(e) = EnvFilter::try_new(level) {
            errors.push(format!("log_level: invalid filter '{}' - {}", level, e));
        }
    }

    if let Some(limit) = config.text_limit {
        if limit == 0 {
            errors.push("text_limit: must be greater than zero".to_string());
        }
    }

    if let Some(ref roster) = config.roster {
        if roster.is_empty() {
            errors.push("roster: must list at least one driver".to_string());
        }
        let mut seen = HashSet::new();
        for (i, driver) in roster.iter().enumerate() {
            if driver.trim().is_empty() {
                errors.push(format!("roster[{}]: driver name is empty", i));
            } else if !seen.insert(driver.as_str()) {
                errors.push(format!("roster[{}]: duplicate driver '{}'", i, driver));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
