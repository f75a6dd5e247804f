use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Cloudinary,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "cloudinary" => Ok(StorageBackend::Cloudinary),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// 本地存储根目录，对外以 /public 暴露
    pub local_root: String,
    /// 拼接本地文件 URL 的前缀
    pub public_base_url: String,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_root: "public".to_string(),
            public_base_url: "/public".to_string(),
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// 为空时不发送邮件
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: bool,
    pub from_email: String,
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            tls: true,
            from_email: "no-reply@localhost".to_string(),
            from_name: "Edu Consult".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
    pub admin_mobile: String,
    pub admin_fname: String,
    pub admin_lname: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            admin_password: "change-me-admin".to_string(),
            admin_mobile: "9999999999".to_string(),
            admin_fname: "Super".to_string(),
            admin_lname: "Admin".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 无配置文件时数据库 URL 必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("PORT", 5151u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 7 * 24 * 3600i64),
                    },
                    storage: StorageConfig::default(),
                    smtp: SmtpConfig::default(),
                    seed: SeedConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        fn set_string(target: &mut String, name: &str) {
            if let Ok(v) = env::var(name) {
                *target = v;
            }
        }
        fn set_parsed<T: std::str::FromStr>(target: &mut T, name: &str) {
            if let Ok(v) = env::var(name)
                && let Ok(parsed) = v.parse()
            {
                *target = parsed;
            }
        }

        set_string(&mut self.server.host, "SERVER_HOST");
        set_parsed(&mut self.server.port, "PORT");
        set_string(&mut self.database.url, "DATABASE_URL");
        set_parsed(&mut self.database.max_connections, "DB_MAX_CONNECTIONS");
        set_string(&mut self.jwt.secret, "JWT_SECRET");
        set_parsed(&mut self.jwt.expires_in, "JWT_EXPIRES_IN");

        set_parsed(&mut self.storage.backend, "STORAGE_BACKEND");
        set_string(&mut self.storage.local_root, "STORAGE_LOCAL_ROOT");
        set_string(&mut self.storage.public_base_url, "STORAGE_PUBLIC_BASE_URL");
        set_string(&mut self.storage.cloudinary.cloud_name, "CLOUDINARY_CLOUD_NAME");
        set_string(&mut self.storage.cloudinary.api_key, "CLOUDINARY_API_KEY");
        set_string(&mut self.storage.cloudinary.api_secret, "CLOUDINARY_API_SECRET");

        set_string(&mut self.smtp.host, "SMTP_HOST");
        set_parsed(&mut self.smtp.port, "SMTP_PORT");
        set_string(&mut self.smtp.username, "SMTP_USERNAME");
        set_string(&mut self.smtp.password, "SMTP_PASSWORD");
        set_parsed(&mut self.smtp.tls, "SMTP_TLS");
        set_string(&mut self.smtp.from_email, "SMTP_FROM_EMAIL");
        set_string(&mut self.smtp.from_name, "SMTP_FROM_NAME");

        set_string(&mut self.seed.admin_email, "ADMIN_EMAIL");
        set_string(&mut self.seed.admin_password, "ADMIN_PASSWORD");
        set_string(&mut self.seed.admin_mobile, "ADMIN_MOBILE");
        set_string(&mut self.seed.admin_fname, "ADMIN_FNAME");
        set_string(&mut self.seed.admin_lname, "ADMIN_LNAME");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_section_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 5151

            [database]
            url = "postgres://localhost/edu"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            expires_in = 604800
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 5151);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.public_base_url, "/public");
        assert!(config.smtp.host.is_empty());
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!(
            "Cloudinary".parse::<StorageBackend>().unwrap(),
            StorageBackend::Cloudinary
        );
        assert!("s3".parse::<StorageBackend>().is_err());
    }
}
