//! Configuration validation.
//!
//! Collects every problem in one pass so a misconfigured deployment fails
//! at startup with the full list instead of one error at a time.

use crate::{AppConfig, WorkerConfig};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { value: u16 },
    /// Pool size must be at least one.
    InvalidPoolSize { value: usize },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: usize, maximum: usize },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Store key must not be empty.
    EmptyKey { name: String },
    /// Initial seat count must not be negative.
    NegativeSeats { value: i64 },
    /// Worker concurrency must be at least one.
    InvalidConcurrency { pool: String, value: usize },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Finished job cap must be at least one.
    InvalidRetention { name: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value } => {
                write!(f, "Invalid server port: {} (must be 1-65535)", value)
            }
            Self::InvalidPoolSize { value } => {
                write!(f, "Invalid pool size: {} (must be at least 1)", value)
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::EmptyKey { name } => write!(f, "Key '{}' must not be empty", name),
            Self::NegativeSeats { value } => {
                write!(f, "Initial seat count must not be negative, got {}", value)
            }
            Self::InvalidConcurrency { pool, value } => {
                write!(f, "Concurrency for '{}' must be at least 1, got {}", pool, value)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::InvalidRetention { name } => {
                write!(f, "Retention setting '{}' must be at least 1", name)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                value: config.server.port,
            });
        }

        Self::validate_redis(config, &mut errors);

        if config.seats.key.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyKey {
                name: "seats.key".to_string(),
            });
        }
        if config.seats.initial < 0 {
            errors.push(ConfigValidationError::NegativeSeats {
                value: config.seats.initial,
            });
        }

        if config.jobs.keep_finished == 0 {
            errors.push(ConfigValidationError::InvalidRetention {
                name: "jobs.keep_finished".to_string(),
            });
        }
        if config.jobs.retention_secs == 0 {
            errors.push(ConfigValidationError::InvalidRetention {
                name: "jobs.retention_secs".to_string(),
            });
        }
        Self::validate_worker("reservations", &config.jobs.reservations, &mut errors);
        Self::validate_worker("notifications", &config.jobs.notifications, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_redis(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let redis = &config.redis;
        if !redis.enabled {
            return;
        }

        match Url::parse(&redis.url) {
            Ok(url) if url.scheme() == "redis" || url.scheme() == "rediss" => {}
            Ok(_) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            }),
        }

        if redis.pool_size == 0 {
            errors.push(ConfigValidationError::InvalidPoolSize { value: 0 });
        } else if redis.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: redis.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if redis.key_prefix.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyKey {
                name: "redis.key_prefix".to_string(),
            });
        }
    }

    fn validate_worker(pool: &str, worker: &WorkerConfig, errors: &mut Vec<ConfigValidationError>) {
        if worker.concurrency == 0 {
            errors.push(ConfigValidationError::InvalidConcurrency {
                pool: pool.to_string(),
                value: 0,
            });
        }
        if worker.job_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: format!("jobs.{}.job_timeout_secs", pool),
                value: 0,
            });
        }
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors, vec![ConfigValidationError::InvalidPort { value: 0 }]);
    }

    #[test]
    fn test_invalid_redis_url() {
        let mut config = AppConfig::default();
        config.redis.url = "http://localhost:6379".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn test_redis_checks_skipped_when_disabled() {
        let mut config = AppConfig::default();
        config.redis.enabled = false;
        config.redis.url = "not a url".to_string();
        config.redis.pool_size = 0;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_pool_size_too_large() {
        let mut config = AppConfig::default();
        config.redis.pool_size = 5000;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::PoolSizeTooLarge {
                value: 5000,
                maximum: 1000
            }]
        );
    }

    #[test]
    fn test_negative_seats() {
        let mut config = AppConfig::default();
        config.seats.initial = -1;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors, vec![ConfigValidationError::NegativeSeats { value: -1 }]);
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = AppConfig::default();
        config.jobs.notifications.concurrency = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::InvalidConcurrency {
                pool: "notifications".to_string(),
                value: 0
            }]
        );
    }

    #[test]
    fn test_zero_retention() {
        let mut config = AppConfig::default();
        config.jobs.keep_finished = 0;
        config.jobs.retention_secs = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigValidationError::InvalidRetention {
                    name: "jobs.keep_finished".to_string()
                },
                ConfigValidationError::InvalidRetention {
                    name: "jobs.retention_secs".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_multiple_errors() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.seats.key = "  ".to_string();
        config.jobs.reservations.job_timeout_secs = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_format_validation_errors() {
        let errors = vec![
            ConfigValidationError::InvalidPort { value: 0 },
            ConfigValidationError::NegativeSeats { value: -5 },
        ];
        let output = format_validation_errors(&errors);
        assert!(output.contains("1. Invalid server port"));
        assert!(output.contains("2. Initial seat count"));
    }
}
