use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("NEWSDESK_ENV", "development"))?;

    let bind_addr = parse("NEWSDESK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("NEWSDESK_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default("NEWSDESK_SOURCES_PATH", "./config/sources.yaml"));
    let pool_path = PathBuf::from(or_default("NEWSDESK_POOL_PATH", "./data/news_pool.json"));
    let explain_cache_path = PathBuf::from(or_default(
        "NEWSDESK_EXPLAIN_CACHE_PATH",
        "./data/explain_cache.json",
    ));

    let fetch_timeout_secs = parse_u64("NEWSDESK_FETCH_TIMEOUT_SECS", "12")?;
    if fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSDESK_FETCH_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    let max_concurrent_sources = parse_usize("NEWSDESK_MAX_CONCURRENT_SOURCES", "4")?;
    let user_agent = or_default("NEWSDESK_USER_AGENT", "newsdesk/0.1 (news-aggregator)");
    let digest_cap = parse_usize("NEWSDESK_DIGEST_CAP", "12")?;
    let collect_cron = or_default("NEWSDESK_COLLECT_CRON", "0 0 * * * *");

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("NEWSDESK_GEMINI_MODEL", "gemini-flash-latest");

    let db_max_connections = parse_u32("NEWSDESK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("NEWSDESK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("NEWSDESK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sources_path,
        pool_path,
        explain_cache_path,
        fetch_timeout_secs,
        max_concurrent_sources,
        user_agent,
        digest_cap,
        collect_cron,
        gemini_api_key,
        gemini_model,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEWSDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
