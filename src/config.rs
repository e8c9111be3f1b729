use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        search_endpoint: get_env_or_default("SEARCH_ENDPOINT", "http://localhost:4000/search"),
        view_base_url: get_env_or_default("VIEW_BASE_URL", "http://localhost:4000/view"),
        debounce: Duration::from_millis(get_env_parsed_or("DEBOUNCE_MS", 500)),
        request_timeout: Duration::from_secs(get_env_parsed_or("REQUEST_TIMEOUT_SECS", 30)),
        initial_query: get_env_or_default("INITIAL_QUERY", "snap"),
        placeholder: get_env_or_default("SEARCH_PLACEHOLDER", "Search phrase"),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub search_endpoint: String,
    pub view_base_url: String,
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub initial_query: String,
    pub placeholder: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
