//! # 日志初始化模块
//!
//! 所有决策点（识别命中、改写、结果清洗、绑定成功/失败）都通过 `tracing` 输出，
//! 日志不参与控制流，初始化失败也不视为错误。

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// 从配置初始化日志系统
///
/// 优先使用环境变量 `RUST_LOG`，否则使用配置中的级别。日志写到标准错误。
/// 已有全局 subscriber 时静默跳过，可重复调用。
///
/// # 示例
/// ```rust,ignore
/// use no_photo_picker::config::LoggingConfig;
///
/// init_tracing_from_config(None);
///
/// let config = LoggingConfig {
///     level: "debug".to_string(),
///     json: true,
///     ..Default::default()
/// };
/// init_tracing_from_config(Some(&config));
/// ```
pub fn init_tracing_from_config(logging_config: Option<&LoggingConfig>) {
    let default_config = LoggingConfig::default();
    let config = logging_config.unwrap_or(&default_config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids)
        .with_file(config.with_file)
        .with_line_number(config.with_line_number)
        .with_env_filter(env_filter);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
