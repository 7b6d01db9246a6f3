use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub web_host: String,
    pub web_port: u16,

    /// When on, server faults render their real message and error chain.
    pub dev_mode: bool,

    /// JSONL event log path. Unset keeps events in memory.
    pub events_path: Option<PathBuf>,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            dev_mode: env::var("DEV_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            events_path: env::var("EVENTS_PATH").ok().map(PathBuf::from),
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "static".to_string())
                .into(),
        }
    }
}
