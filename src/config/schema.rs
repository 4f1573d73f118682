use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::prediction::DEFAULT_TEXT_LIMIT;

/// Application configuration.
///
/// Every key is optional; an empty file is a valid config.
///
/// Example YAML:
/// ```yaml
/// ledger_path: /srv/apex/ledger.json
/// log_level: info
/// text_limit: 500
/// roster:
///   - "Max Verstappen (Red Bull)"
///   - "Lando Norris (McLaren)"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Season ledger location (default: ~/.config/apex-predict/ledger.json)
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,

    /// tracing filter directive when --verbose is not given (default: warn)
    #[serde(default)]
    pub log_level: Option<String>,

    /// Valid drivers for the season. Replaces the built-in 2026 grid.
    #[serde(default)]
    pub roster: Option<Vec<String>>,

    /// Character cap for wild prediction, biggest flop and biggest surprise
    #[serde(default)]
    pub text_limit: Option<usize>,
}

impl Config {
    pub fn text_limit(&self) -> usize {
        self.text_limit.unwrap_or(DEFAULT_TEXT_LIMIT)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}
