use serde::{Deserialize, Serialize};

use super::types::{HookContextKind, MethodSelector};
use crate::intent::keys::REQUEST_CLASS;

/// 请求在被拦截调用中的位置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetRole {
    /// 在参数列表中查找请求
    #[default]
    Request,
    /// 请求保存在接收者实例字段中
    RequestField { field: String },
    /// 结果回传，调用完成后清洗（结果码，载荷）两个参数槽位
    Result { code_slot: usize, payload_slot: usize },
}

/// 候选目标定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetDefinition {
    pub name: String,
    pub enabled: bool,
    pub class: String,
    pub method: String,
    /// 为空时绑定该方法名的全部重载
    pub params: Option<Vec<String>>,
    pub role: TargetRole,
}

impl Default for TargetDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            class: String::new(),
            method: String::new(),
            params: None,
            role: TargetRole::Request,
        }
    }
}

impl TargetDefinition {
    pub fn new<C: Into<String>, M: Into<String>>(class: C, method: M) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.params = Some(params.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_role(mut self, role: TargetRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = name.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selector(&self) -> MethodSelector {
        match &self.params {
            Some(params) => MethodSelector::Exact {
                name: self.method.clone(),
                params: params.clone(),
            },
            None => MethodSelector::AllOverloads(self.method.clone()),
        }
    }

    /// 日志来源标签，如 `System:com.android.server.am.ActivityManagerService.startActivity`
    pub fn label(&self, context: HookContextKind) -> String {
        if self.name.is_empty() {
            format!("{context}:{}.{}", self.class, self.method)
        } else {
            format!("{context}:{}", self.name)
        }
    }

    pub fn is_result_hook(&self) -> bool {
        matches!(self.role, TargetRole::Result { .. })
    }
}

/// 平台服务层候选：不同版本经由不同的服务类启动组件，部分版本同时存在多条路径
pub fn default_system_targets() -> Vec<TargetDefinition> {
    vec![
        TargetDefinition::new("com.android.server.wm.ActivityTaskManagerService", "startActivity"),
        TargetDefinition::new("com.android.server.am.ActivityManagerService", "startActivity"),
        TargetDefinition::new("com.android.server.am.ActivityStarter", "startActivity"),
        TargetDefinition::new("com.android.server.wm.ActivityStarter", "execute").with_role(
            TargetRole::RequestField {
                field: "mRequest.intent".to_string(),
            },
        ),
        TargetDefinition::new("com.android.server.pm.PackageManagerService", "resolveIntent")
            .disabled(),
    ]
}

/// 应用层稳定入口：启动组件、启动并等待结果、结果回传
pub fn default_application_targets() -> Vec<TargetDefinition> {
    vec![
        TargetDefinition::new("android.app.Activity", "startActivity").with_params(&[REQUEST_CLASS]),
        TargetDefinition::new("android.app.Activity", "startActivityForResult")
            .with_params(&[REQUEST_CLASS, "int"]),
        TargetDefinition::new("android.app.Activity", "onActivityResult")
            .with_params(&["int", "int", REQUEST_CLASS])
            .with_role(TargetRole::Result {
                code_slot: 1,
                payload_slot: 2,
            }),
    ]
}
