use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{InterceptError, Result};
use crate::intent::Request;

/// Hook 所属上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookContextKind {
    /// 宿主平台服务层
    System,
    /// 单个应用进程
    Application,
}

impl fmt::Display for HookContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookContextKind::System => write!(f, "System"),
            HookContextKind::Application => write!(f, "App"),
        }
    }
}

/// 一次加载事件对应的命名空间
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadScope {
    pub package: String,
    /// 普通应用进程都带有应用信息，系统框架没有
    pub has_app_info: bool,
}

impl LoadScope {
    pub const SYSTEM_PACKAGE: &'static str = "android";

    pub fn system() -> Self {
        Self {
            package: Self::SYSTEM_PACKAGE.to_string(),
            has_app_info: false,
        }
    }

    pub fn application<T: Into<String>>(package: T) -> Self {
        Self {
            package: package.into(),
            has_app_info: true,
        }
    }

    pub fn context(&self) -> HookContextKind {
        if self.package == Self::SYSTEM_PACKAGE || !self.has_app_info {
            HookContextKind::System
        } else {
            HookContextKind::Application
        }
    }
}

/// 类句柄，由拦截机制在探测成功后给出
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassHandle {
    name: String,
    token: u64,
}

impl ClassHandle {
    pub fn new<T: Into<String>>(name: T, token: u64) -> Self {
        Self {
            name: name.into(),
            token,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// 方法选择方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodSelector {
    /// 同名的全部重载
    AllOverloads(String),
    /// 按参数类型精确匹配
    Exact { name: String, params: Vec<String> },
}

impl MethodSelector {
    pub fn name(&self) -> &str {
        match self {
            MethodSelector::AllOverloads(name) => name,
            MethodSelector::Exact { name, .. } => name,
        }
    }
}

impl fmt::Display for MethodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSelector::AllOverloads(name) => write!(f, "{name}(*)"),
            MethodSelector::Exact { name, params } => write!(f, "{name}({})", params.join(", ")),
        }
    }
}

/// 被拦截调用中的一个参数
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
    Request(Request),
    /// 本系统不关心的其他对象，只保留类型名
    Object(String),
}

impl CallArg {
    pub fn as_request(&self) -> Option<&Request> {
        match self {
            CallArg::Request(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            CallArg::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            CallArg::Null => "null",
            CallArg::Bool(_) => "boolean",
            CallArg::Int(_) => "int",
            CallArg::Long(_) => "long",
            CallArg::Str(_) => "java.lang.String",
            CallArg::Request(_) => crate::intent::keys::REQUEST_CLASS,
            CallArg::Object(name) => name,
        }
    }
}

/// 可按下标读写的参数列表
///
/// 替换第 i 个槽位对调用的后续执行可见。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgList {
    slots: Vec<CallArg>,
}

impl ArgList {
    pub fn new(slots: Vec<CallArg>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CallArg> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallArg> {
        self.slots.iter()
    }

    /// 替换指定槽位并返回旧值
    pub fn replace(&mut self, index: usize, value: CallArg) -> Result<CallArg> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            InterceptError::shape(format!("argument slot {index} out of range (len={len})"))
        })?;
        Ok(std::mem::replace(slot, value))
    }

    pub fn into_inner(self) -> Vec<CallArg> {
        self.slots
    }
}

impl From<Vec<CallArg>> for ArgList {
    fn from(slots: Vec<CallArg>) -> Self {
        Self::new(slots)
    }
}

/// 按名称读写接收者实例字段，路径以 `.` 分隔
pub trait FieldAccessor {
    fn read_field(&self, path: &str) -> Result<CallArg>;

    fn write_field(&mut self, path: &str, value: CallArg) -> Result<()>;
}

/// Hook 回调可见的调用上下文
///
/// 由拦截机制在单次调用期间独占持有，回调返回后不得保留引用。
pub struct InterceptedCall<'a> {
    pub class: &'a str,
    pub method: &'a str,
    pub args: &'a mut ArgList,
    pub receiver: Option<&'a mut dyn FieldAccessor>,
}

impl<'a> InterceptedCall<'a> {
    pub fn new(class: &'a str, method: &'a str, args: &'a mut ArgList) -> Self {
        Self {
            class,
            method,
            args,
            receiver: None,
        }
    }

    pub fn with_receiver(mut self, receiver: &'a mut dyn FieldAccessor) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

impl fmt::Debug for InterceptedCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedCall")
            .field("class", &self.class)
            .field("method", &self.method)
            .field("args", &self.args)
            .field("receiver", &self.receiver.is_some())
            .finish()
    }
}

/// 方法 Hook 回调
pub trait MethodHook: Send + Sync {
    fn before(&self, _call: &mut InterceptedCall<'_>) {}

    fn after(&self, _call: &mut InterceptedCall<'_>) {}
}

impl<T> MethodHook for Arc<T>
where
    T: MethodHook + ?Sized,
{
    fn before(&self, call: &mut InterceptedCall<'_>) {
        (**self).before(call)
    }

    fn after(&self, call: &mut InterceptedCall<'_>) {
        (**self).after(call)
    }
}

/// 外部拦截机制
pub trait Interceptor: Send + Sync {
    fn find_class_if_exists(&self, class_name: &str, scope: &LoadScope) -> Option<ClassHandle>;

    /// 返回实际挂上的方法数量
    fn bind_before(
        &self,
        class: &ClassHandle,
        method: &MethodSelector,
        hook: Arc<dyn MethodHook>,
    ) -> Result<usize>;

    fn bind_after(
        &self,
        class: &ClassHandle,
        method: &MethodSelector,
        hook: Arc<dyn MethodHook>,
    ) -> Result<usize>;
}

/// 单个候选目标的绑定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Bound { methods: usize },
    Absent,
    Disabled,
    BindError(String),
}

impl BindOutcome {
    pub fn is_bound(&self) -> bool {
        matches!(self, BindOutcome::Bound { .. })
    }
}

/// 注册阶段尝试绑定的目标，仅在注册期间存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTarget {
    pub context: HookContextKind,
    pub class: String,
    pub method: MethodSelector,
    pub label: String,
    pub outcome: BindOutcome,
}
