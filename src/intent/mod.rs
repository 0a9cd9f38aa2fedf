//! 结构化请求模型
//!
//! - `Request` 对应宿主平台的"启动组件 + 数据"请求，也作为结果载荷
//! - `keys` 收录本系统读写的外部键词汇，不在此定义其语义

pub mod keys;
mod request;

pub use request::{ClipData, ClipItem, ComponentName, ExtraValue, IntentFlags, Request};
