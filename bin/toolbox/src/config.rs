//! Process-wide defaults, loaded from environment variables at startup.

use std::path::PathBuf;

use toolbox_core::{Quality, ThreadCount};

/// Runtime configuration for the toolbox binary.
///
/// Command-line flags override these per invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// `tracing` filter string, e.g. `"warn"` or `"toolbox_core=debug"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Default WebP quality (1–100).
    pub quality: Quality,

    /// Default worker count (1–16).
    pub threads: ThreadCount,

    /// Where converted files are written.
    pub out_dir: PathBuf,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("TOOLBOX_LOG", "warn"),
            log_json: std::env::var("TOOLBOX_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            quality: parse_env("TOOLBOX_QUALITY", Quality::default()),
            threads: parse_env("TOOLBOX_THREADS", ThreadCount::default()),
            out_dir: PathBuf::from(env_or("TOOLBOX_OUT_DIR", ".")),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Unset or unparsable (including out-of-range) values yield `default`.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
