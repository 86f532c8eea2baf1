//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（lullaby.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageKind};
use crate::application::narrator::BackendKind;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["lullaby", "lullaby.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `LULLABY_`，层级分隔符 `__`）
/// 2. 配置文件（lullaby.toml 或 lullaby.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `LULLABY_API__BASE_URL=http://story-server:5000`
/// - `LULLABY_NARRATION__BACKEND=local`
/// - `LULLABY_NARRATION__SEGMENTATION=sentence_pairs`
/// - `LULLABY_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("api.base_url", "http://localhost:5000")?
        .set_default("api.timeout_secs", 60)?
        .set_default("narration.backend", "remote")?
        .set_default("narration.segmentation", "paragraph")?
        .set_default("narration.sentences_per_segment", 2)?
        .set_default("narration.prefetch", false)?
        .set_default("narration.mid_stream_retries", 1)?
        .set_default("speech.command", "espeak-ng")?
        .set_default("speech.rate", 0.8)?
        .set_default("speech.pitch", 1.0)?
        .set_default("speech.volume", 1.0)?
        .set_default("speech.voice_hint", "female")?
        .set_default("player.command", "ffplay")?
        .set_default("storage.kind", "file")?
        .set_default("storage.session_dir", "data/session")?
        .set_default("log.level", "warn")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: LULLABY_API__BASE_URL=http://story-server:5000
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("LULLABY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "API base URL cannot be empty".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "API timeout cannot be 0".to_string(),
        ));
    }

    if config.narration.sentences_per_segment == 0 {
        return Err(ConfigError::ValidationError(
            "Sentences per segment must be at least 1".to_string(),
        ));
    }

    let speech = &config.speech;
    if !(speech.rate > 0.0 && speech.rate <= 10.0) {
        return Err(ConfigError::ValidationError(format!(
            "Speech rate must be in (0, 10], got {}",
            speech.rate
        )));
    }
    if !(0.0..=2.0).contains(&speech.pitch) {
        return Err(ConfigError::ValidationError(format!(
            "Speech pitch must be in [0, 2], got {}",
            speech.pitch
        )));
    }
    if !(0.0..=1.0).contains(&speech.volume) {
        return Err(ConfigError::ValidationError(format!(
            "Speech volume must be in [0, 1], got {}",
            speech.volume
        )));
    }

    if speech.command.trim().is_empty() || config.player.command.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech and player commands cannot be empty".to_string(),
        ));
    }

    if config.storage.kind == StorageKind::File
        && config.storage.session_dir.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Session directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("API Base URL: {}", config.api.base_url);
    tracing::info!("API Timeout: {}s", config.api.timeout_secs);
    tracing::info!("Narration Backend: {}", config.narration.backend.as_str());
    tracing::info!(
        "Segmentation: {} ({} sentences per segment)",
        config.narration.segmentation.as_str(),
        config.narration.sentences_per_segment
    );
    tracing::info!("Prefetch: {}", config.narration.prefetch);
    tracing::info!("Mid-stream Retries: {}", config.narration.mid_stream_retries);
    if config.narration.backend == BackendKind::Local {
        tracing::info!(
            "Speech: {} rate={} pitch={} volume={} voice={}",
            config.speech.command,
            config.speech.rate,
            config.speech.pitch,
            config.speech.volume,
            config.speech.voice_hint
        );
    } else {
        tracing::info!("Player: {} {:?}", config.player.command, config.player.args);
    }
    match config.storage.kind {
        StorageKind::Memory => tracing::info!("Session Storage: memory"),
        StorageKind::File => {
            tracing::info!("Session Storage: {:?}", config.storage.session_dir)
        }
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
