//! Packed Vulkan version numbers.
use ash::vk;
use std::fmt;

/// A version number in the Vulkan packing scheme: 3 bits variant, 7 bits
/// major, 10 bits minor and 12 bits patch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(u32);

impl ApiVersion {
    /// Vulkan 1.0, reported by loaders that predate `vkEnumerateInstanceVersion`.
    pub const V1_0: ApiVersion = ApiVersion(vk::API_VERSION_1_0);

    /// Pack the four fields. Out of range fields are truncated by the
    /// packing scheme.
    #[inline]
    pub fn new(variant: u32, major: u32, minor: u32, patch: u32) -> ApiVersion {
        ApiVersion(vk::make_api_version(variant, major, minor, patch))
    }

    /// Wrap a packed version as returned by the driver.
    #[inline]
    pub fn from_raw(raw: u32) -> ApiVersion {
        ApiVersion(raw)
    }

    /// The packed value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The variant field, always 0 for Vulkan proper.
    #[inline]
    pub fn variant(self) -> u32 {
        vk::api_version_variant(self.0)
    }

    /// The major field.
    #[inline]
    pub fn major(self) -> u32 {
        vk::api_version_major(self.0)
    }

    /// The minor field.
    #[inline]
    pub fn minor(self) -> u32 {
        vk::api_version_minor(self.0)
    }

    /// The patch field.
    #[inline]
    pub fn patch(self) -> u32 {
        vk::api_version_patch(self.0)
    }
}

impl From<u32> for ApiVersion {
    fn from(raw: u32) -> Self {
        ApiVersion(raw)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.variant(),
            self.major(),
            self.minor(),
            self.patch()
        )
    }
}
