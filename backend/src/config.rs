//! Runtime settings.
//!
//! Read from the process environment after `.env` has been loaded with
//! `dotenvy`. Command-line flags override individual values.
//!
//! | Variable                  | Default       |
//! |---------------------------|---------------|
//! | `SUBVAL_OUTPUT_ROOT`      | `.`           |
//! | `SUBVAL_PORT`             | `3000`        |
//! | `SUBVAL_MAX_UPLOAD_BYTES` | `26214400`    |

use std::path::PathBuf;
use std::str::FromStr;

use crate::api::logs::log_warning;

pub const OUTPUT_ROOT_VAR: &str = "SUBVAL_OUTPUT_ROOT";
pub const PORT_VAR: &str = "SUBVAL_PORT";
pub const MAX_UPLOAD_VAR: &str = "SUBVAL_MAX_UPLOAD_BYTES";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Parent of every `<company_id>/` output directory
    pub output_root: PathBuf,
    /// Dashboard API port
    pub port: u16,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparsable values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            output_root: lookup(OUTPUT_ROOT_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            port: parse_or(&lookup, PORT_VAR, defaults.port),
            max_upload_bytes: parse_or(&lookup, MAX_UPLOAD_VAR, defaults.max_upload_bytes),
        }
    }

    pub fn with_output_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.output_root = root;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log_warning(format!("Ignoring {key}={raw}: not a valid value"));
                default
            }
        },
    }
}
