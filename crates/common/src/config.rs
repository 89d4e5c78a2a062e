/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Webhook ingress
    pub webhook_secret: String,

    // HTTP server
    pub port: u16,

    // Database holding the server-side favorite ledger
    pub database_url: String,

    // Demo data / synthetic ingress
    pub seed_demo_signals: bool,
    pub simulate_interval_secs: Option<u64>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let seed_demo_signals = match optional_env("SEED_DEMO_SIGNALS")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => panic!(
                "ERROR: SEED_DEMO_SIGNALS must be 'true' or 'false', got: '{other}'"
            ),
        };

        let simulate_interval_secs = optional_env("SIMULATE_INTERVAL_SECS").map(|v| {
            v.trim().parse::<u64>().unwrap_or_else(|_| {
                panic!("SIMULATE_INTERVAL_SECS must be a whole number of seconds, got: '{v}'")
            })
        });

        Config {
            webhook_secret: required_env("WEBHOOK_SECRET"),
            port: optional_env("SIGNALS_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: required_env("DATABASE_URL"),
            seed_demo_signals,
            simulate_interval_secs: simulate_interval_secs.filter(|&secs| secs > 0),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
