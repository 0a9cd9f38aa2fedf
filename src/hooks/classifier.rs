use serde::{Deserialize, Serialize};

use crate::intent::{Request, keys};

/// 单条照片选择器识别规则，多条规则之间为逻辑或
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ClassificationRule {
    ActionEquals { action: String },
    /// 组件类名包含片段（不区分大小写）
    ComponentContains { fragment: String },
    ExtraPresent { key: String },
}

impl ClassificationRule {
    pub fn action<T: Into<String>>(action: T) -> Self {
        ClassificationRule::ActionEquals {
            action: action.into(),
        }
    }

    pub fn component<T: Into<String>>(fragment: T) -> Self {
        ClassificationRule::ComponentContains {
            fragment: fragment.into(),
        }
    }

    pub fn extra<T: Into<String>>(key: T) -> Self {
        ClassificationRule::ExtraPresent { key: key.into() }
    }

    /// 缺失的动作或组件视为该条规则不匹配
    pub fn matches(&self, request: &Request) -> bool {
        match self {
            ClassificationRule::ActionEquals { action } => request.action() == Some(action.as_str()),
            ClassificationRule::ComponentContains { fragment } => request
                .component_class()
                .map(|class| contains_ignore_case(class, fragment))
                .unwrap_or(false),
            ClassificationRule::ExtraPresent { key } => request.has_extra(key),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// 识别规则配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub actions: Vec<String>,
    pub component_fragments: Vec<String>,
    pub marker_extras: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            actions: vec![
                keys::ACTION_PICK_IMAGES.to_string(),
                keys::ACTION_PICK_VISUAL_MEDIA.to_string(),
            ],
            component_fragments: vec!["PhotoPicker".to_string(), "MediaPicker".to_string()],
            marker_extras: vec![
                keys::EXTRA_ANDROIDX_PICK_IMAGES_MAX.to_string(),
                keys::EXTRA_GMS_PICK_IMAGES_MAX.to_string(),
            ],
        }
    }
}

impl ClassifierConfig {
    pub fn rules(&self) -> Vec<ClassificationRule> {
        let actions = self.actions.iter().cloned().map(ClassificationRule::action);
        let components = self
            .component_fragments
            .iter()
            .filter(|fragment| !fragment.is_empty())
            .cloned()
            .map(ClassificationRule::component);
        let extras = self.marker_extras.iter().cloned().map(ClassificationRule::extra);
        actions.chain(components).chain(extras).collect()
    }
}

/// 照片选择器请求识别器
///
/// 宁可漏判也不误判：漏判只会让原请求原样通过，误判会破坏无关调用。
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

impl RequestClassifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.rules())
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, request: &Request) -> bool {
        self.matching_rule(request).is_some()
    }

    /// 返回第一条命中的规则；已是通用文档选择请求的永远不命中，避免多层拦截重复改写
    pub fn matching_rule(&self, request: &Request) -> Option<&ClassificationRule> {
        if request.action() == Some(keys::ACTION_GET_CONTENT) {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(request))
    }
}
