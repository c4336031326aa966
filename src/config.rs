use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Viewport size in CSS pixels. Also used as the browser window size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { width: 1280, height: 800 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Mac,
    Windows,
    Ubuntu,
    #[default]
    Browser,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Mac => "mac",
            Environment::Windows => "windows",
            Environment::Ubuntu => "ubuntu",
            Environment::Browser => "browser",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct ComputerConfig {
    pub dimensions: Dimensions,
    pub environment: Environment,
    /// Env `COMPUTER_START_URL`.
    pub start_url: String,
    /// Env `COMPUTER_HEADLESS`.
    pub headless: bool,
    /// Env `CHROME_WS_URL`. Attach to this browser instead of launching one.
    pub connect_url: Option<String>,
    pub user_agent: Option<String>,
    pub wait_interval: Duration,
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            environment: Environment::Browser,
            start_url: env::var("COMPUTER_START_URL").unwrap_or_else(|_| "about:blank".into()),
            headless: env::var("COMPUTER_HEADLESS").map(|v| parse_flag(&v)).unwrap_or(false),
            connect_url: env::var("CHROME_WS_URL").ok().filter(|v| !v.trim().is_empty()),
            user_agent: None,
            wait_interval: Duration::from_secs(1),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
