use crate::controller::DEFAULT_SUGGESTION_WINDOW;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub suggestion_window: Duration,
    /// Sign this user in at startup instead of waiting for the sign-in form.
    pub auto_sign_in: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8080),
            data_path: env::var("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/moods.json")),
            suggestion_window: env::var("SUGGESTION_WINDOW_SECS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SUGGESTION_WINDOW),
            auto_sign_in: env::var("MOODCHECK_USER")
                .ok()
                .filter(|name| !name.trim().is_empty()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
