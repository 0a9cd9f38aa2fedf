//! 配置模块
//!
//! 该模块提供拦截器的配置加载，包括：
//! - 平台服务层与应用层候选目标表
//! - 照片选择器识别规则
//! - 平台版本覆盖
//! - 日志配置
//!
//! 文件与目录两种来源：目录下的 `*.toml` 按文件名顺序合并，后者覆盖前者。
//! 所有来源均失败时使用内置默认值。

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use toml::Value;
use tracing::warn;

use crate::error::{InterceptError, Result};
use crate::hooks::{
    ClassifierConfig, TargetDefinition, default_application_targets, default_system_targets,
};
use crate::platform::{PlatformRevision, StaticPlatform};

/// 全局配置实例，只初始化一次
static APP_CONFIG: OnceLock<PickerConfig> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 优先
    pub level: String,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_file: bool,
    pub with_line_number: bool,
    /// 输出 JSON 格式
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
            with_thread_ids: true,
            with_file: false,
            with_line_number: false,
            json: false,
        }
    }
}

/// 拦截器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// 平台服务层候选目标
    pub system: Vec<TargetDefinition>,
    /// 应用层候选目标
    pub application: Vec<TargetDefinition>,
    pub classifier: ClassifierConfig,
    /// 未配置时按最新平台处理
    pub platform: Option<StaticPlatform>,
    pub logging: LoggingConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            system: default_system_targets(),
            application: default_application_targets(),
            classifier: ClassifierConfig::default(),
            platform: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl PickerConfig {
    pub fn platform(&self) -> Arc<dyn PlatformRevision> {
        Arc::new(self.platform.unwrap_or_default())
    }
}

/// 配置加载器，按候选路径顺序尝试
pub struct PickerConfigLoader {
    candidate_paths: Vec<PathBuf>,
}

impl Default for PickerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerConfigLoader {
    pub fn new() -> Self {
        Self {
            candidate_paths: vec![
                PathBuf::from("config/picker.toml"),
                PathBuf::from("config/picker.d"),
            ],
        }
    }

    /// 仅使用给定路径
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            candidate_paths: vec![path.into()],
        }
    }

    pub fn add_candidate<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.candidate_paths.push(path.into());
        self
    }

    /// 第一个加载成功的来源生效，全部失败时返回默认配置
    pub fn load(&self) -> PickerConfig {
        for path in &self.candidate_paths {
            match load_from_source(path) {
                Ok(cfg) => return cfg,
                Err(err) => warn!("failed to load config from {}: {err}", path.display()),
            }
        }

        warn!("no configuration source succeeded, falling back to defaults");
        PickerConfig::default()
    }
}

/// 加载全局配置
pub fn load_config(path: Option<&str>) -> &'static PickerConfig {
    APP_CONFIG.get_or_init(|| match path {
        Some(p) => PickerConfigLoader::with_path(p).load(),
        None => PickerConfigLoader::new().load(),
    })
}

fn config_error(path: &Path, reason: impl std::fmt::Display) -> InterceptError {
    InterceptError::Config {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// 从文件或目录加载配置
pub fn load_from_source(path: &Path) -> Result<PickerConfig> {
    if !path.exists() {
        return Err(config_error(path, "path does not exist"));
    }

    let metadata = path.metadata().map_err(|err| config_error(path, err))?;
    let merged = if metadata.is_dir() {
        load_directory(path)?
    } else {
        load_toml_value(path)?
    };

    merged
        .try_into::<PickerConfig>()
        .map_err(|err| config_error(path, format!("invalid configuration: {err}")))
}

/// 合并目录中的配置片段
fn load_directory(dir: &Path) -> Result<Value> {
    let mut entries = fs::read_dir(dir)
        .map_err(|err| config_error(dir, err))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(OsStr::to_str)
                .map(|ext| ext.eq_ignore_ascii_case("toml"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    if entries.is_empty() {
        return Err(config_error(dir, "no toml fragments found"));
    }
    entries.sort_by_key(|entry| entry.path());

    let mut merged = Value::Table(Default::default());
    for entry in entries {
        let value = load_toml_value(&entry.path())?;
        merge_value(&mut merged, value);
    }
    Ok(merged)
}

fn load_toml_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|err| config_error(path, err))?;
    toml::from_str(&content).map_err(|err| config_error(path, format!("invalid TOML: {err}")))
}

/// 片段叠加：两侧都是表时逐键深合并，否则片段值整体替换（数组不拼接）
fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(existing) = base_table.get_mut(&key) {
                    merge_value(existing, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
