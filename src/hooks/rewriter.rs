use std::sync::Arc;

use crate::intent::{IntentFlags, Request, keys};
use crate::platform::{PlatformRevision, StaticPlatform, supports_pick_images_max};

/// 从原请求解析出的选择参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerParams {
    pub mime_types: Vec<String>,
    pub allow_multiple: bool,
    /// -1 表示未指定或平台不支持
    pub max_items: i32,
}

impl PickerParams {
    pub fn multi_select(&self) -> bool {
        self.allow_multiple || self.max_items > 1
    }
}

/// 将照片选择器请求改写为通用文档选择请求
///
/// 对输入是纯函数：不修改原请求，总是返回新实例。
#[derive(Clone)]
pub struct RequestRewriter {
    platform: Arc<dyn PlatformRevision>,
}

impl Default for RequestRewriter {
    fn default() -> Self {
        Self::new(Arc::new(StaticPlatform::default()))
    }
}

impl std::fmt::Debug for RequestRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRewriter")
            .field("sdk_int", &self.platform.sdk_int())
            .finish()
    }
}

impl RequestRewriter {
    pub fn new(platform: Arc<dyn PlatformRevision>) -> Self {
        Self { platform }
    }

    pub fn resolve(&self, original: &Request) -> PickerParams {
        PickerParams {
            mime_types: resolve_mime_types(original),
            allow_multiple: original.bool_extra(keys::EXTRA_ALLOW_MULTIPLE, false),
            max_items: self.max_items(original),
        }
    }

    pub fn rewrite(&self, original: &Request) -> Request {
        let params = self.resolve(original);

        let mut rewritten = Request::new(keys::ACTION_GET_CONTENT);
        rewritten.add_category(keys::CATEGORY_OPENABLE);

        let declared = match params.mime_types.as_slice() {
            [single] => single.clone(),
            _ => keys::WILDCARD_MIME.to_string(),
        };
        if params.mime_types.len() > 1 || params.mime_types.first() != Some(&declared) {
            rewritten.put_extra(keys::EXTRA_MIME_TYPES, params.mime_types.clone());
        }
        rewritten.set_type(declared);

        if params.multi_select() {
            rewritten.put_extra(keys::EXTRA_ALLOW_MULTIPLE, true);
            tracing::debug!(
                allow_multiple = params.allow_multiple,
                max_items = params.max_items,
                "multi-select enabled"
            );
        }

        rewritten.add_flags(IntentFlags::GRANT_READ_URI_PERMISSION);
        tracing::info!(
            mime = ?rewritten.mime_type,
            mime_types = ?params.mime_types,
            multiple = params.multi_select(),
            "created document picker request"
        );
        rewritten
    }

    /// 平台键只在支持的平台上读取，老版本平台上不探测扩展版本。
    /// 库层标记键不是平台调用，总是作为回落读取。
    fn max_items(&self, original: &Request) -> i32 {
        if supports_pick_images_max(self.platform.as_ref())
            && original.has_extra(keys::EXTRA_PICK_IMAGES_MAX)
        {
            return original.int_extra(keys::EXTRA_PICK_IMAGES_MAX, -1);
        }

        [keys::EXTRA_ANDROIDX_PICK_IMAGES_MAX, keys::EXTRA_GMS_PICK_IMAGES_MAX]
            .into_iter()
            .find(|key| original.has_extra(key))
            .map(|key| original.int_extra(key, -1))
            .unwrap_or(-1)
    }
}

/// 按历史键名顺序解析 MIME，依次回落到声明类型与 `image/*`
fn resolve_mime_types(original: &Request) -> Vec<String> {
    for key in keys::MIME_TYPE_KEYS {
        if let Some(values) = original.string_array_extra(key) {
            if !values.is_empty() {
                return values.to_vec();
            }
        }
        if let Some(value) = original.string_extra(key) {
            return vec![value.to_string()];
        }
    }

    let fallback = original
        .mime_type
        .as_deref()
        .unwrap_or(keys::DEFAULT_IMAGE_MIME);
    vec![fallback.to_string()]
}
