use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub draw: DrawConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Local,
    Github,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StoreBackend::Local),
            "github" => Ok(StoreBackend::Github),
            other => Err(AppError::ConfigError(format!(
                "unknown store backend '{other}' (expected local or github)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// 本地存储根目录
    pub data_dir: String,
    /// 版本冲突时 HTTP 层额外重试次数
    pub conflict_retries: u32,
    /// 远程存储请求超时 (秒)
    pub timeout_secs: u64,
    pub github: GithubConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            data_dir: "data".to_string(),
            conflict_retries: 3,
            timeout_secs: 15,
            github: GithubConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// 仓库内存放 JSON 文件的目录 (可为空)
    pub path_prefix: String,
    pub token: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            path_prefix: String::new(),
            token: String::new(),
        }
    }
}

impl GithubConfig {
    pub fn has_credentials(&self) -> bool {
        !self.owner.is_empty() && !self.repo.is_empty() && !self.token.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// 参考时区相对 UTC 的偏移 (分钟), 默认 UTC+3
    pub utc_offset_minutes: i32,
    /// 开奖日, 周日 = 0
    pub weekdays: Vec<u32>,
    /// 开奖时刻 (HH:MM, 参考时区)
    pub time: String,
    /// 定时开奖写入存储的超时 (秒)
    pub persist_timeout_secs: u64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 180,
            weekdays: vec![2, 6],
            time: "00:01".to_string(),
            persist_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: "1001".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时使用默认值, 之后统一由环境变量覆盖
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {config_path}, using defaults and environment");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("failed to parse config file: {e}")))
    }

    fn apply_env_overrides(&mut self) -> AppResult<()> {
        fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|v| v.parse::<T>().ok())
        }

        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get_env_parse("SERVER_PORT") {
            self.server.port = p;
        }
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Ok(v) = env::var("STORE_DATA_DIR") {
            self.store.data_dir = v;
        }
        if let Some(n) = get_env_parse("STORE_CONFLICT_RETRIES") {
            self.store.conflict_retries = n;
        }
        if let Some(n) = get_env_parse("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = n;
        }
        if let Ok(v) = env::var("GITHUB_API_BASE") {
            self.store.github.api_base = v;
        }
        if let Ok(v) = env::var("GITHUB_OWNER") {
            self.store.github.owner = v;
        }
        if let Ok(v) = env::var("GITHUB_REPO") {
            self.store.github.repo = v;
        }
        if let Ok(v) = env::var("GITHUB_BRANCH") {
            self.store.github.branch = v;
        }
        if let Ok(v) = env::var("GITHUB_PATH_PREFIX") {
            self.store.github.path_prefix = v;
        }
        if let Ok(v) = env::var("GITHUB_TOKEN") {
            self.store.github.token = v;
        }
        if let Some(n) = get_env_parse("DRAW_UTC_OFFSET_MINUTES") {
            self.draw.utc_offset_minutes = n;
        }
        if let Ok(v) = env::var("DRAW_TIME") {
            self.draw.time = v;
        }
        if let Ok(v) = env::var("AUTH_PASSWORD") {
            self.auth.password = v;
        }

        Ok(())
    }
}
