use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use warden_infra::database::manager::DatabaseOptions;
use warden_service::security::SuperAdmin;
use warden_web::MiddlewareOptions;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub security: SecurityConfig,
    pub super_admin: SuperAdminConfig,
    pub auth: AuthConfig,
    pub policy: PolicyConfig,
    pub setup: SetupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求的超时，超时后事务随作用域一起回滚
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://warden.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    pub fn options(&self) -> DatabaseOptions {
        DatabaseOptions {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            sqlx_logging: self.sqlx_logging,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// EnvFilter 语法，RUST_LOG 优先
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// 秒
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_issuer: "warden".to_string(),
            jwt_expiration: 7200,
            bcrypt_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuperAdminConfig {
    pub username: String,
    pub realname: String,
    pub password: String,
}

impl Default for SuperAdminConfig {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            realname: "超级管理员".to_string(),
            password: "abc-123".to_string(),
        }
    }
}

impl SuperAdminConfig {
    pub fn to_super_admin(&self) -> SuperAdmin {
        SuperAdmin {
            username: self.username.clone(),
            realname: self.realname.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enable: bool,
    pub ignore_path_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enable: true,
            ignore_path_prefixes: vec!["/api/v1/publics/user/login".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub enable: bool,
    /// 定时重载兜底
    pub auto_load: bool,
    pub auto_load_interval_secs: u64,
    pub ignore_path_prefixes: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enable: true,
            auto_load: false,
            auto_load_interval_secs: 60,
            ignore_path_prefixes: vec!["/api/v1/publics/".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// YAML 菜单树文件
    pub menu_file: Option<PathBuf>,
}

impl Config {
    /// 加载配置：默认值 < warden.toml < ~/.warden/warden.toml（或显式路径）< WARDEN_ 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        // .env 先写进进程环境，再交给 Environment 源读取
        dotenv::dotenv().ok();

        let mut builder = config::Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
                let config_path = home_dir.join(".warden").join("warden.toml");
                builder = builder
                    .add_source(config::File::with_name("warden.toml").required(false))
                    .add_source(config::File::from(config_path.as_path()).required(false));
            }
        }

        Self::from_builder(builder.add_source(environment()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn middleware_options(&self) -> MiddlewareOptions {
        MiddlewareOptions {
            auth_enable: self.auth.enable,
            auth_ignore_path_prefixes: self.auth.ignore_path_prefixes.clone(),
            policy_enable: self.policy.enable,
            policy_ignore_path_prefixes: self.policy.ignore_path_prefixes.clone(),
            super_admin: self.super_admin.username.clone(),
        }
    }
}

/// `WARDEN_DATABASE__URL` 这样的变量；前缀列表用逗号分隔
fn environment() -> config::Environment {
    config::Environment::with_prefix("WARDEN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("auth.ignore_path_prefixes")
        .with_list_parse_key("policy.ignore_path_prefixes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Config::from_builder(builder).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.log.format, LogFormat::Text);
        assert!(config.auth.enable);
        assert_eq!(config.super_admin.username, "root");
        assert!(config.setup.menu_file.is_none());

        let options = config.middleware_options();
        assert!(options.skips_auth("/api/v1/publics/user/login"));
        assert!(!options.skips_auth("/api/v1/publics/user"));
        assert!(options.skips_policy("/api/v1/publics/user/menutree"));
        assert!(!options.skips_policy("/api/v1/menus"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse(
            r#"
            [server]
            port = 9000

            [log]
            format = "json"

            [policy]
            auto_load = true
            ignore_path_prefixes = []

            [super_admin]
            username = "admin"
            password = "secret"
            "#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(config.policy.auto_load);
        assert_eq!(config.policy.auto_load_interval_secs, 60);
        assert!(config.policy.ignore_path_prefixes.is_empty());
        assert_eq!(config.super_admin.realname, "超级管理员");
        assert_eq!(config.middleware_options().super_admin, "admin");
        assert_eq!(config.database.options().connect_timeout, Duration::from_secs(8));
    }
}
