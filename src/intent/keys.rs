//! 宿主平台请求词汇表（动作、额外键、结果码）

/// 平台标准的"选择图片"动作
pub const ACTION_PICK_IMAGES: &str = "android.provider.action.PICK_IMAGES";
/// androidx 兼容库使用的"选择可视媒体"别名
pub const ACTION_PICK_VISUAL_MEDIA: &str =
    "androidx.activity.result.contract.action.PickVisualMedia";
/// 通用文档选择动作
pub const ACTION_GET_CONTENT: &str = "android.intent.action.GET_CONTENT";

pub const CATEGORY_OPENABLE: &str = "android.intent.category.OPENABLE";

/// 标准多 MIME 额外键
pub const EXTRA_MIME_TYPES: &str = "android.intent.extra.MIME_TYPES";
pub const EXTRA_PROVIDER_MIME_TYPES: &str = "android.provider.extra.MIME_TYPES";
pub const EXTRA_PICK_VISUAL_MEDIA_MIME_TYPE: &str =
    "androidx.activity.result.contract.extra.PickVisualMedia.MimeType";

/// 按优先级排列的历史 MIME 额外键
pub const MIME_TYPE_KEYS: [&str; 3] = [
    EXTRA_MIME_TYPES,
    EXTRA_PROVIDER_MIME_TYPES,
    EXTRA_PICK_VISUAL_MEDIA_MIME_TYPE,
];

pub const EXTRA_ALLOW_MULTIPLE: &str = "android.intent.extra.ALLOW_MULTIPLE";
pub const EXTRA_PICK_IMAGES_MAX: &str = "android.provider.extra.PICK_IMAGES_MAX";

/// 不同代兼容库用于请求照片选择器行为的标记键
pub const EXTRA_ANDROIDX_PICK_IMAGES_MAX: &str =
    "androidx.activity.result.contract.extra.PICK_IMAGES_MAX";
pub const EXTRA_GMS_PICK_IMAGES_MAX: &str = "com.google.android.gms.provider.extra.PICK_IMAGES_MAX";

pub const EXTRA_STREAM: &str = "android.intent.extra.STREAM";
pub const EXTRA_CONTENT_ANNOTATIONS: &str = "android.intent.extra.CONTENT_ANNOTATIONS";

pub const DEFAULT_IMAGE_MIME: &str = "image/*";
pub const WILDCARD_MIME: &str = "*/*";

pub const RESULT_OK: i32 = -1;
pub const RESULT_CANCELED: i32 = 0;

pub const REQUEST_CLASS: &str = "android.content.Intent";
