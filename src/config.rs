use std::env;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bookings.db";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3007,http://localhost:3001";

/// Server settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_ok() {
            log::info!("Loaded .env file");
        }

        Self {
            bind: var_or("BOOKIFY_BIND", DEFAULT_BIND),
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            allowed_origins: parse_origins(&var_or(
                "BOOKIFY_ALLOWED_ORIGINS",
                DEFAULT_ALLOWED_ORIGINS,
            )),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

/// Split a comma-separated origin list. Browsers send only scheme, host and
/// port in `Origin`, so any path is cut off and the resulting duplicates dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        let origin = match origin.find("://") {
            Some(scheme_end) => match origin[scheme_end + 3..].find('/') {
                Some(path_start) => &origin[..scheme_end + 3 + path_start],
                None => origin,
            },
            None => origin,
        };
        if !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_string());
        }
    }
    origins
}
