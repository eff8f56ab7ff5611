use crate::config::types::{
    Config, CrawlerConfig, DocumentsConfig, HttpConfig, SeedsConfig, ServerConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_documents_config(&config.documents)?;
    validate_seeds_config(&config.seeds)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    // job_deadline_secs = 0 means "no deadline" and is valid

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Header values must stay within visible ASCII or reqwest rejects them
    if !config
        .user_agent
        .chars()
        .all(|c| (' '..='~').contains(&c))
    {
        return Err(ConfigError::Validation(format!(
            "user_agent contains non-ASCII characters: '{}'",
            config.user_agent
        )));
    }

    if config.accept_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept_language cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates document download configuration
fn validate_documents_config(config: &DocumentsConfig) -> Result<(), ConfigError> {
    if config.download_dir.is_empty() {
        return Err(ConfigError::Validation(
            "download_dir cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_downloads < 1 || config.max_concurrent_downloads > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_downloads must be between 1 and 100, got {}",
            config.max_concurrent_downloads
        )));
    }

    if config.download_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "download_timeout_secs must be >= 1, got {}",
            config.download_timeout_secs
        )));
    }

    Ok(())
}

/// Validates seed generation configuration
fn validate_seeds_config(config: &SeedsConfig) -> Result<(), ConfigError> {
    if config.max_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max_urls must be >= 1, got {}",
            config.max_urls
        )));
    }

    Ok(())
}

/// Validates HTTP service configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .bind_addr
        .parse::<SocketAddr>()
        .map_err(|e| {
            ConfigError::Validation(format!(
                "bind_addr '{}' is not a valid socket address: {}",
                config.bind_addr, e
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.max_concurrent_fetches = 0;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_fetches = 101;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_fetches = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_fetch_timeout_rejected() {
        let mut config = Config::default();
        config.crawler.fetch_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_deadline_means_none_and_is_valid() {
        let mut config = Config::default();
        config.crawler.job_deadline_secs = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = Config::default();
        config.http.user_agent = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_ascii_user_agent_rejected() {
        let mut config = Config::default();
        config.http.user_agent = "Crawlér/1.0".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_download_dir_rejected() {
        let mut config = Config::default();
        config.documents.download_dir = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_download_concurrency_rejected() {
        let mut config = Config::default();
        config.documents.max_concurrent_downloads = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_seed_cap_rejected() {
        let mut config = Config::default();
        config.seeds.max_urls = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_bind_addr_rejected() {
        let mut config = Config::default();
        config.server.bind_addr = "not-an-addr".to_string();
        assert!(validate(&config).is_err());

        config.server.bind_addr = "127.0.0.1:0".to_string();
        assert!(validate(&config).is_ok());
    }
}
