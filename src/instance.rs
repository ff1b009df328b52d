//! Instance creation request.
use crate::{debug, ProbeSmallVec};
use ash::extensions::{ext::DebugUtils, khr::Surface};
use ash::vk;
use std::{
    ffi::{CStr, CString, NulError},
    fmt,
    os::raw::c_char,
};

/// Everything needed to build a [`vk::InstanceCreateInfo`].
///
/// The defaults are what the probe asks for: `VK_KHR_surface`,
/// `VK_EXT_debug_utils`, portability enumeration, no layers, and a debug
/// messenger listening to every severity and message type, chained into the
/// creation call so messages emitted while the instance is being created are
/// reported too.
#[derive(Clone)]
pub struct InstanceRequest {
    app_name: CString,
    app_version: u32,
    engine_name: CString,
    engine_version: u32,
    api_version: u32,
    layers: ProbeSmallVec<CString>,
    extensions: ProbeSmallVec<CString>,
    portability_enumeration: bool,
    debug_messenger: bool,
    debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl InstanceRequest {
    /// Create a request with the probe's defaults.
    #[inline]
    pub fn new() -> Self {
        InstanceRequest {
            app_name: CString::from(cstr::cstr!("vkprobe")),
            app_version: vk::make_api_version(0, 1, 0, 0),
            engine_name: CString::from(cstr::cstr!("No Engine")),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::API_VERSION_1_0,
            layers: ProbeSmallVec::new(),
            extensions: [Surface::name(), DebugUtils::name()]
                .into_iter()
                .map(CStr::to_owned)
                .collect(),
            portability_enumeration: true,
            debug_messenger: true,
            debug_message_severity: debug::all_severities(),
            debug_message_type: debug::all_message_types(),
        }
    }

    /// A request with no extensions, no portability enumeration and no
    /// debug messenger.
    #[inline]
    pub fn bare() -> Self {
        InstanceRequest {
            extensions: ProbeSmallVec::new(),
            portability_enumeration: false,
            debug_messenger: false,
            ..InstanceRequest::new()
        }
    }

    /// Application name to advertise.
    #[inline]
    pub fn app_name(mut self, app_name: &str) -> Result<Self, NulError> {
        self.app_name = CString::new(app_name)?;
        Ok(self)
    }

    /// Application version to advertise.
    #[inline]
    pub fn app_version(mut self, major: u32, minor: u32) -> Self {
        self.app_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Application version to advertise.
    #[inline]
    pub fn app_version_raw(mut self, app_version: u32) -> Self {
        self.app_version = app_version;
        self
    }

    /// Engine name to advertise.
    #[inline]
    pub fn engine_name(mut self, engine_name: &str) -> Result<Self, NulError> {
        self.engine_name = CString::new(engine_name)?;
        Ok(self)
    }

    /// Engine version to advertise.
    #[inline]
    pub fn engine_version(mut self, major: u32, minor: u32) -> Self {
        self.engine_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Engine version to advertise.
    #[inline]
    pub fn engine_version_raw(mut self, engine_version: u32) -> Self {
        self.engine_version = engine_version;
        self
    }

    /// Instance API version to request.
    #[inline]
    pub fn api_version(mut self, major: u32, minor: u32) -> Self {
        self.api_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Instance API version to request.
    #[inline]
    pub fn api_version_raw(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Enable this layer. Nothing checks that it is installed; the driver
    /// rejects the request if it is not.
    #[inline]
    pub fn request_layer(mut self, layer: &CStr) -> Self {
        if !self.layers.iter().any(|l| l.as_c_str() == layer) {
            self.layers.push(layer.to_owned());
        }
        self
    }

    /// Enable this extension. Nothing checks that it is available.
    #[inline]
    pub fn request_extension(mut self, extension: &CStr) -> Self {
        if !self.extensions.iter().any(|e| e.as_c_str() == extension) {
            self.extensions.push(extension.to_owned());
        }
        self
    }

    /// Toggle `VK_KHR_portability_enumeration` together with the
    /// `ENUMERATE_PORTABILITY_KHR` create flag.
    #[inline]
    pub fn portability_enumeration(mut self, enabled: bool) -> Self {
        self.portability_enumeration = enabled;
        self
    }

    /// Toggle the debug messenger. It is only registered when
    /// `VK_EXT_debug_utils` is among the requested extensions.
    #[inline]
    pub fn debug_messenger(mut self, enabled: bool) -> Self {
        self.debug_messenger = enabled;
        self
    }

    /// Filter for the severity of debug messages.
    #[inline]
    pub fn debug_message_severity(
        mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> Self {
        self.debug_message_severity = severity;
        self
    }

    /// Filter for the type of debug messages.
    #[inline]
    pub fn debug_message_type(mut self, ty: vk::DebugUtilsMessageTypeFlagsEXT) -> Self {
        self.debug_message_type = ty;
        self
    }

    /// Layers that will be enabled.
    #[inline]
    pub fn enabled_layers(&self) -> &[CString] {
        &self.layers
    }

    /// Extensions that will be enabled, including
    /// `VK_KHR_portability_enumeration` when requested.
    pub fn enabled_extensions(&self) -> ProbeSmallVec<&CStr> {
        let mut names: ProbeSmallVec<&CStr> =
            self.extensions.iter().map(CString::as_c_str).collect();

        let portability = vk::KhrPortabilityEnumerationFn::name();
        if self.portability_enumeration && !names.contains(&portability) {
            names.push(portability);
        }

        names
    }

    /// Returns true if `extension` will be enabled.
    #[inline]
    pub fn is_extension_enabled(&self, extension: &CStr) -> bool {
        self.enabled_extensions().contains(&extension)
    }

    /// Whether a debug messenger is chained into creation and registered
    /// afterwards.
    #[inline]
    pub fn wants_debug_messenger(&self) -> bool {
        self.debug_messenger && self.is_extension_enabled(DebugUtils::name())
    }

    /// Instance create flags.
    #[inline]
    pub fn create_flags(&self) -> vk::InstanceCreateFlags {
        if self.portability_enumeration {
            vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
        } else {
            vk::InstanceCreateFlags::empty()
        }
    }

    /// Messenger description using [`debug::debug_callback`].
    pub fn messenger_create_info(&self) -> vk::DebugUtilsMessengerCreateInfoEXT {
        vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(self.debug_message_severity)
            .message_type(self.debug_message_type)
            .pfn_user_callback(Some(debug::debug_callback))
            .build()
    }

    /// Build the create info and hand it to `f`. Every pointer in it stays
    /// valid for the duration of the call only.
    pub fn with_create_info<R>(&self, f: impl FnOnce(&vk::InstanceCreateInfo) -> R) -> R {
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&self.app_name)
            .application_version(self.app_version)
            .engine_name(&self.engine_name)
            .engine_version(self.engine_version)
            .api_version(self.api_version);

        let layers: ProbeSmallVec<*const c_char> =
            self.layers.iter().map(|name| name.as_ptr()).collect();
        let extensions: ProbeSmallVec<*const c_char> = self
            .enabled_extensions()
            .into_iter()
            .map(CStr::as_ptr)
            .collect();

        let mut messenger_info = self.messenger_create_info();
        let mut create_info = vk::InstanceCreateInfo::builder()
            .flags(self.create_flags())
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions);

        if self.wants_debug_messenger() {
            create_info = create_info.push_next(&mut messenger_info);
        }

        f(&*create_info)
    }
}

impl Default for InstanceRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceRequest {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("InstanceRequest")
            .field("app_name", &self.app_name)
            .field(
                "api_version",
                &format_args!(
                    "{}.{}",
                    vk::api_version_major(self.api_version),
                    vk::api_version_minor(self.api_version)
                ),
            )
            .field("layers", &self.layers)
            .field("extensions", &self.enabled_extensions())
            .field("create_flags", &self.create_flags())
            .field("debug_messenger", &self.wants_debug_messenger())
            .finish()
    }
}
