//! NoPhotoPicker 拦截核心库
//!
//! 将"启动照片选择器"请求透明替换为通用文档选择请求，并把名义成功但没有载荷的
//! 结果改写为取消，调用方不会观察到空的成功结果。
//!
//! 底层 Hook 机制通过 [`hooks::Interceptor`] 接入，本库只负责目标探测与请求变换。

pub mod config;
pub mod error;
pub mod hooks;
pub mod intent;
pub mod platform;
pub mod tracing;

pub use config::{LoggingConfig, PickerConfig, PickerConfigLoader, load_config};
pub use error::{InterceptError, Result};
pub use hooks::*;
pub use intent::{ClipData, ClipItem, ComponentName, ExtraValue, IntentFlags, Request};
pub use platform::{PlatformRevision, StaticPlatform};
