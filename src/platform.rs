//! 平台版本探测
//!
//! 扩展版本查询在低于 R (API 30) 的版本上不可用，调用方必须先判断 SDK 级别。

use serde::Deserialize;

pub const SDK_R: u32 = 30;
pub const SDK_TIRAMISU: u32 = 33;

/// 照片选择器最大数量额外键所需的 R 扩展版本
const PICK_IMAGES_MAX_EXTENSION: u32 = 2;

/// 运行时平台版本
pub trait PlatformRevision: Send + Sync {
    fn sdk_int(&self) -> u32;

    /// 指定 SDK 级别的扩展版本，只允许在 `sdk_int() >= SDK_R` 时调用
    fn extension_version(&self, level: u32) -> u32;
}

/// 平台是否暴露照片选择器最大数量额外键
pub fn supports_pick_images_max(platform: &dyn PlatformRevision) -> bool {
    let sdk = platform.sdk_int();
    if sdk >= SDK_TIRAMISU {
        return true;
    }
    sdk >= SDK_R && platform.extension_version(SDK_R) >= PICK_IMAGES_MAX_EXTENSION
}

/// 由配置给出的静态平台信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StaticPlatform {
    pub sdk_int: u32,
    #[serde(default)]
    pub r_extension: u32,
}

impl StaticPlatform {
    pub fn new(sdk_int: u32, r_extension: u32) -> Self {
        Self {
            sdk_int,
            r_extension,
        }
    }
}

impl Default for StaticPlatform {
    fn default() -> Self {
        Self::new(SDK_TIRAMISU, 0)
    }
}

impl PlatformRevision for StaticPlatform {
    fn sdk_int(&self) -> u32 {
        self.sdk_int
    }

    fn extension_version(&self, level: u32) -> u32 {
        if level == SDK_R { self.r_extension } else { 0 }
    }
}
