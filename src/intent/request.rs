use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// 请求标志位
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct IntentFlags: u32 {
        /// 授予接收方读取返回 URI 的权限
        const GRANT_READ_URI_PERMISSION = 0x0000_0001;
        /// 授予接收方写入返回 URI 的权限
        const GRANT_WRITE_URI_PERMISSION = 0x0000_0002;
        const GRANT_PERSISTABLE_URI_PERMISSION = 0x0000_0040;
        const ACTIVITY_NEW_TASK = 0x1000_0000;
    }
}

/// 目标组件（包名 + 类名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new<P: Into<String>, C: Into<String>>(package: P, class: C) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }
}

/// 额外数据的类型化取值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Bool(bool),
    Int(i32),
    String(String),
    StringArray(Vec<String>),
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Bool(value)
    }
}

impl From<i32> for ExtraValue {
    fn from(value: i32) -> Self {
        ExtraValue::Int(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::String(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::String(value)
    }
}

impl From<Vec<String>> for ExtraValue {
    fn from(value: Vec<String>) -> Self {
        ExtraValue::StringArray(value)
    }
}

impl From<&[&str]> for ExtraValue {
    fn from(value: &[&str]) -> Self {
        ExtraValue::StringArray(value.iter().map(|s| s.to_string()).collect())
    }
}

/// 批量选择结果中的单项
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipItem {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ClipItem {
    pub fn uri<T: Into<String>>(uri: T) -> Self {
        Self {
            uri: Some(uri.into()),
            text: None,
        }
    }
}

/// 批量选择结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipData {
    #[serde(default)]
    pub items: Vec<ClipItem>,
}

impl ClipData {
    pub fn new(items: Vec<ClipItem>) -> Self {
        Self { items }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn has_uri(&self) -> bool {
        self.items.iter().any(|item| item.uri.is_some())
    }
}

/// 结构化启动请求
///
/// 既用于"启动某组件"的请求，也用于结果回传的载荷。
/// 实例之间不共享身份：改写总是构造新实例。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub component: Option<ComponentName>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    /// 单项数据引用
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub clip_data: Option<ClipData>,
    #[serde(default)]
    pub extras: BTreeMap<String, ExtraValue>,
    #[serde(default)]
    pub flags: IntentFlags,
}

impl Request {
    pub fn new<T: Into<String>>(action: T) -> Self {
        Self {
            action: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component: ComponentName) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_type<T: Into<String>>(mut self, mime_type: T) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_data<T: Into<String>>(mut self, uri: T) -> Self {
        self.data = Some(uri.into());
        self
    }

    pub fn with_clip_data(mut self, clip_data: ClipData) -> Self {
        self.clip_data = Some(clip_data);
        self
    }

    pub fn with_extra<K: Into<String>, V: Into<ExtraValue>>(mut self, key: K, value: V) -> Self {
        self.put_extra(key, value);
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn component_class(&self) -> Option<&str> {
        self.component.as_ref().map(|c| c.class.as_str())
    }

    pub fn add_category<T: Into<String>>(&mut self, category: T) {
        self.categories.insert(category.into());
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn set_type<T: Into<String>>(&mut self, mime_type: T) {
        self.mime_type = Some(mime_type.into());
    }

    pub fn add_flags(&mut self, flags: IntentFlags) {
        self.flags |= flags;
    }

    pub fn put_extra<K: Into<String>, V: Into<ExtraValue>>(&mut self, key: K, value: V) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn has_extra(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    pub fn extra(&self, key: &str) -> Option<&ExtraValue> {
        self.extras.get(key)
    }

    /// 类型不符时返回 `None`
    pub fn string_array_extra(&self, key: &str) -> Option<&[String]> {
        match self.extras.get(key) {
            Some(ExtraValue::StringArray(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn string_extra(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(ExtraValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn bool_extra(&self, key: &str, default: bool) -> bool {
        match self.extras.get(key) {
            Some(ExtraValue::Bool(value)) => *value,
            _ => default,
        }
    }

    pub fn int_extra(&self, key: &str, default: i32) -> i32 {
        match self.extras.get(key) {
            Some(ExtraValue::Int(value)) => *value,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_extra_access() {
        let request = Request::new("android.intent.action.VIEW")
            .with_extra("flag", true)
            .with_extra("count", 3)
            .with_extra("name", "photo")
            .with_extra("types", &["image/png", "image/jpeg"][..]);

        assert!(request.bool_extra("flag", false));
        assert_eq!(request.int_extra("count", -1), 3);
        assert_eq!(request.string_extra("name"), Some("photo"));
        assert_eq!(
            request.string_array_extra("types"),
            Some(&["image/png".to_string(), "image/jpeg".to_string()][..])
        );

        // 类型不符时回落到默认值
        assert_eq!(request.int_extra("flag", -1), -1);
        assert!(!request.bool_extra("count", false));
        assert_eq!(request.string_array_extra("name"), None);
    }

    #[test]
    fn test_clip_data_uri_presence() {
        let empty = ClipData::new(vec![ClipItem::default(), ClipItem::default()]);
        assert_eq!(empty.item_count(), 2);
        assert!(!empty.has_uri());

        let populated = ClipData::new(vec![ClipItem::default(), ClipItem::uri("content://m/1")]);
        assert!(populated.has_uri());
    }

    #[test]
    fn test_request_from_json() {
        let raw = r#"{
            "action": "android.provider.action.PICK_IMAGES",
            "type": "image/png",
            "extras": {
                "android.intent.extra.ALLOW_MULTIPLE": true,
                "android.provider.extra.PICK_IMAGES_MAX": 4,
                "android.intent.extra.MIME_TYPES": ["image/png", "image/gif"]
            },
            "flags": "GRANT_READ_URI_PERMISSION"
        }"#;
        let request: Request = serde_json::from_str(raw).unwrap();

        assert_eq!(request.action(), Some("android.provider.action.PICK_IMAGES"));
        assert_eq!(request.mime_type.as_deref(), Some("image/png"));
        assert!(request.bool_extra("android.intent.extra.ALLOW_MULTIPLE", false));
        assert_eq!(request.int_extra("android.provider.extra.PICK_IMAGES_MAX", -1), 4);
        assert!(request.flags.contains(IntentFlags::GRANT_READ_URI_PERMISSION));
    }
}
