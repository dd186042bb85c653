//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// 令牌有效期上限（小时），约 100 年
const MAX_EXPIRATION_HOURS: f64 = 24.0 * 365.0 * 100.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:5000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL；未设置时使用内存存储
    pub url: Option<Secret<String>>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// Token signing parameters shared by the issuer and the access gate.
///
/// Loaded once at startup and never mutated afterwards. None of the fields
/// has a default: a missing value aborts startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    /// HMAC-SHA256 密钥（使用 Secret 包装，防止日志泄露）
    pub secret: Secret<String>,
    pub issuer: String,
    pub audience: String,
    /// 令牌有效期（小时，可为小数）
    pub expiration_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 创建账户时拒绝重复的登录名
    pub enforce_unique_login: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub jwt: SigningConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置（签名配置没有默认值）
        settings = settings
            .set_default("server.addr", "0.0.0.0:5000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("auth.enforce_unique_login", true)?;

        // 从环境变量加载配置（前缀为 PRODUCT_）
        settings = settings.add_source(
            Environment::with_prefix("PRODUCT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        self.jwt.validate()
    }
}

impl SigningConfig {
    /// 验证签名配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        // HS256 密钥至少 32 字节
        if self.secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Message("JWT issuer must not be empty".to_string()));
        }

        if self.audience.trim().is_empty() {
            return Err(ConfigError::Message("JWT audience must not be empty".to_string()));
        }

        if !self.expiration_hours.is_finite() || self.expiration_hours <= 0.0 {
            return Err(ConfigError::Message(
                "JWT expiration_hours must be a positive number".to_string(),
            ));
        }

        if self.expiration_hours > MAX_EXPIRATION_HOURS {
            return Err(ConfigError::Message(format!(
                "JWT expiration_hours must not exceed {}",
                MAX_EXPIRATION_HOURS
            )));
        }

        if self.lifetime() <= chrono::Duration::zero() {
            return Err(ConfigError::Message(
                "JWT expiration_hours is too small to produce a usable lifetime".to_string(),
            ));
        }

        Ok(())
    }

    /// Token lifetime as a chrono duration, millisecond precision.
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.expiration_hours * 3_600_000.0).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PRODUCT_SERVER__ADDR",
        "PRODUCT_LOGGING__LEVEL",
        "PRODUCT_DATABASE__URL",
        "PRODUCT_JWT__SECRET",
        "PRODUCT_JWT__ISSUER",
        "PRODUCT_JWT__AUDIENCE",
        "PRODUCT_JWT__EXPIRATION_HOURS",
        "PRODUCT_AUTH__ENFORCE_UNIQUE_LOGIN",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn set_signing_env() {
        std::env::set_var("PRODUCT_JWT__SECRET", "test_secret_key_32_characters_long!");
        std::env::set_var("PRODUCT_JWT__ISSUER", "product-service");
        std::env::set_var("PRODUCT_JWT__AUDIENCE", "product-clients");
        std::env::set_var("PRODUCT_JWT__EXPIRATION_HOURS", "1.5");
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        set_signing_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:5000");
        assert_eq!(config.logging.level, "info");
        assert!(config.database.url.is_none());
        assert!(config.auth.enforce_unique_login);
        assert_eq!(config.jwt.issuer, "product-service");
        assert_eq!(config.jwt.audience, "product-clients");
        assert_eq!(config.jwt.expiration_hours, 1.5);
        assert_eq!(config.jwt.lifetime(), chrono::Duration::minutes(90));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_signing_field_is_fatal() {
        for missing in [
            "PRODUCT_JWT__SECRET",
            "PRODUCT_JWT__ISSUER",
            "PRODUCT_JWT__AUDIENCE",
            "PRODUCT_JWT__EXPIRATION_HOURS",
        ] {
            clear_env();
            set_signing_env();
            std::env::remove_var(missing);

            assert!(AppConfig::from_env().is_err(), "{missing} should be required");
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn test_short_secret_rejected() {
        clear_env();
        set_signing_env();
        std::env::set_var("PRODUCT_JWT__SECRET", "too-short");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_non_positive_lifetime_rejected() {
        clear_env();
        set_signing_env();
        std::env::set_var("PRODUCT_JWT__EXPIRATION_HOURS", "0");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_out_of_range_lifetime_rejected() {
        for hours in ["1e12", "876001", "0.0000001", "NaN"] {
            clear_env();
            set_signing_env();
            std::env::set_var("PRODUCT_JWT__EXPIRATION_HOURS", hours);

            assert!(AppConfig::from_env().is_err(), "{hours} should be rejected");
        }

        clear_env();
    }

    #[test]
    fn test_lifetime_bounds_checked_directly() {
        let mut config = SigningConfig {
            secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
            issuer: "product-service".to_string(),
            audience: "product-clients".to_string(),
            expiration_hours: MAX_EXPIRATION_HOURS,
        };
        assert!(config.validate().is_ok());

        config.expiration_hours = 1e12;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_port() {
        clear_env();
        set_signing_env();
        std::env::set_var("PRODUCT_SERVER__ADDR", "0.0.0.0:80");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        clear_env();
        set_signing_env();
        std::env::set_var("PRODUCT_LOGGING__LEVEL", "invalid");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unique_login_can_be_disabled() {
        clear_env();
        set_signing_env();
        std::env::set_var("PRODUCT_AUTH__ENFORCE_UNIQUE_LOGIN", "false");

        let config = AppConfig::from_env().unwrap();
        assert!(!config.auth.enforce_unique_login);

        clear_env();
    }
}
