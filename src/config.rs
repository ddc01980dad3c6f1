use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 内容服务 API 配置 ---
    pub content_api_base_url: String,
    pub content_api_token: String,
    // --- 客户端取题配置 ---
    /// 等待生成完成的硬截止时间（秒）
    pub generation_timeout_secs: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 轮询次数上限
    pub poll_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            content_api_base_url: "https://lms-api.lexue.cn".to_string(),
            content_api_token: String::new(),
            generation_timeout_secs: 30,
            poll_interval_ms: 2000,
            poll_max_attempts: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            content_api_base_url: std::env::var("CONTENT_API_BASE_URL").unwrap_or(default.content_api_base_url),
            content_api_token: std::env::var("CONTENT_API_TOKEN").unwrap_or(default.content_api_token),
            generation_timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation_timeout_secs),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            poll_max_attempts: std::env::var("POLL_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_max_attempts),
        }
    }

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }
}
