//! 照片选择器拦截模块
//!
//! - 注册中心在平台服务层与应用层探测候选目标并挂载回调
//! - 分发层在调用前识别并改写请求，在结果回传后清洗空载荷
//! - 识别、改写、清洗均为无副作用的全函数，失败处理只发生在注册与分发两层

mod classifier;
mod config;
mod dispatch;
mod registry;
mod rewriter;
pub mod sanitizer;
mod types;

pub use classifier::{ClassificationRule, ClassifierConfig, RequestClassifier};
pub use config::{
    TargetDefinition, TargetRole, default_application_targets, default_system_targets,
};
pub use dispatch::{DispatchHook, DispatchOutcome, HookDispatcher};
pub use registry::{GlobalTargetRegistry, RegistrationReport, TargetRegistry};
pub use rewriter::{PickerParams, RequestRewriter};
pub use sanitizer::{Sanitized, is_empty_payload, sanitize};
pub use types::{
    ArgList, BindOutcome, CallArg, ClassHandle, FieldAccessor, HookContextKind, HookTarget,
    InterceptedCall, Interceptor, LoadScope, MethodHook, MethodSelector,
};
