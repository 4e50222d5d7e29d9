/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Password for ADMIN_LOGIN. Change it outside of local play.
    pub admin_password: String,
    /// Pause before a bot takes its turn action, in milliseconds
    pub bot_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let bot_delay_ms = std::env::var("KILLER_BOT_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1500);

        Self {
            bind_addr: std::env::var("KILLER_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            admin_password: std::env::var("KILLER_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "change-me-before-hosting".to_string()),
            bot_delay_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            admin_password: "change-me-before-hosting".to_string(),
            bot_delay_ms: 1500,
        }
    }
}
