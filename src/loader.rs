//! The capability API: the handful of loader entry points the probe calls.
use crate::{ApiVersion, InstanceRequest, ProbeError};
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use log::{debug, warn};
use std::{
    ffi::{CStr, OsStr},
    ptr,
};

/// The entry points the probe needs, in a form that can be mocked.
///
/// The enumeration methods follow the Vulkan two-call convention: with
/// `None` they write the number of available records to `count`; with a
/// buffer they fill at most `count` records, write back how many were
/// written and return `VK_INCOMPLETE` if more were available.
pub trait CapabilityApi {
    /// Live instance. Dropping it destroys the instance.
    type Instance;

    /// `vkEnumerateInstanceVersion`, or 1.0 when the loader lacks it.
    fn instance_version(&self) -> Result<ApiVersion, vk::Result>;

    /// `vkEnumerateInstanceLayerProperties`.
    fn instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result;

    /// `vkEnumerateInstanceExtensionProperties`, filtered by `layer` when
    /// given.
    fn instance_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;

    /// `vkCreateInstance`, followed by loading the instance-level entry
    /// points the request needs.
    fn create_instance(&self, request: &InstanceRequest) -> Result<Self::Instance, vk::Result>;
}

impl<A: CapabilityApi + ?Sized> CapabilityApi for &A {
    type Instance = A::Instance;

    #[inline]
    fn instance_version(&self) -> Result<ApiVersion, vk::Result> {
        (**self).instance_version()
    }

    #[inline]
    fn instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        (**self).instance_layer_properties(count, properties)
    }

    #[inline]
    fn instance_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        (**self).instance_extension_properties(layer, count, properties)
    }

    #[inline]
    fn create_instance(&self, request: &InstanceRequest) -> Result<Self::Instance, vk::Result> {
        (**self).create_instance(request)
    }
}

/// [`CapabilityApi`] over the system Vulkan loader.
#[derive(Clone)]
pub struct VulkanLoader {
    entry: Entry,
}

impl VulkanLoader {
    /// Load `libvulkan` and resolve the global entry points.
    pub fn load() -> Result<VulkanLoader, ProbeError> {
        let entry = unsafe { Entry::load() }?;
        debug!("Vulkan loader resolved");
        Ok(VulkanLoader { entry })
    }

    /// Load the Vulkan loader from an explicit library path.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<VulkanLoader, ProbeError> {
        let entry = unsafe { Entry::load_from(path) }?;
        debug!("Vulkan loader resolved");
        Ok(VulkanLoader { entry })
    }

    /// Use an already loaded entry.
    #[inline]
    pub fn from_entry(entry: Entry) -> VulkanLoader {
        VulkanLoader { entry }
    }

    /// The underlying `ash` entry.
    #[inline]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

/// Clamp the count to the buffer so a stale count can never overrun it.
fn out_pointer<T>(count: &mut u32, properties: Option<&mut [T]>) -> *mut T {
    match properties {
        Some(properties) => {
            *count = (*count).min(properties.len() as u32);
            properties.as_mut_ptr()
        }
        None => ptr::null_mut(),
    }
}

impl CapabilityApi for VulkanLoader {
    type Instance = VulkanInstance;

    fn instance_version(&self) -> Result<ApiVersion, vk::Result> {
        self.entry
            .try_enumerate_instance_version()
            .map(|version| version.map_or(ApiVersion::V1_0, ApiVersion::from_raw))
    }

    fn instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        let properties = out_pointer(count, properties);
        unsafe { (self.entry.fp_v1_0().enumerate_instance_layer_properties)(count, properties) }
    }

    fn instance_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let layer = layer.map_or(ptr::null(), CStr::as_ptr);
        let properties = out_pointer(count, properties);
        unsafe {
            (self.entry.fp_v1_0().enumerate_instance_extension_properties)(layer, count, properties)
        }
    }

    fn create_instance(&self, request: &InstanceRequest) -> Result<VulkanInstance, vk::Result> {
        let instance =
            request.with_create_info(|info| unsafe { self.entry.create_instance(info, None) })?;

        let debug_utils = request
            .wants_debug_messenger()
            .then(|| DebugUtils::new(&self.entry, &instance));

        let messenger = debug_utils.as_ref().and_then(|debug_utils| {
            let info = request.messenger_create_info();
            match unsafe { debug_utils.create_debug_utils_messenger(&info, None) } {
                Ok(messenger) => Some(messenger),
                Err(err) => {
                    warn!("debug messenger registration failed: {err}");
                    None
                }
            }
        });

        Ok(VulkanInstance {
            entry: self.entry.clone(),
            instance,
            debug_utils,
            messenger,
        })
    }
}

/// An instance created through [`VulkanLoader`], with its persistent debug
/// messenger if one was registered.
pub struct VulkanInstance {
    // Keeps the loader library alive until the instance is gone.
    #[allow(dead_code)]
    entry: Entry,
    instance: Instance,
    debug_utils: Option<DebugUtils>,
    messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanInstance {
    /// The instance function table.
    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The persistent debug messenger, if registration succeeded.
    #[inline]
    pub fn messenger(&self) -> Option<vk::DebugUtilsMessengerEXT> {
        self.messenger
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.messenger.take())
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
        debug!("Vulkan instance destroyed");
    }
}
