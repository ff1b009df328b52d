//! The probe-and-report routine.
use crate::enumerate::{enumerate_two_call, fixed_cstr};
use crate::{report, CapabilityApi, InstanceRequest, ProbeError, Session};
use ash::vk;
use log::{debug, warn};
use std::{ffi::CStr, io::Write};

/// How far the probe runs. Each stage includes the ones before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ProbeStage {
    /// Instance version only.
    Version,
    /// Plus instance layers.
    Layers,
    /// Plus extensions, per layer and global.
    Extensions,
    /// Plus instance creation with the debug messenger.
    #[default]
    Instance,
}

/// What to probe and how to create the instance.
#[derive(Debug, Clone, Default)]
pub struct ProbeOptions {
    stage: ProbeStage,
    request: InstanceRequest,
}

impl ProbeOptions {
    /// Full probe with the default [`InstanceRequest`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `stage`.
    #[inline]
    pub fn stage(mut self, stage: ProbeStage) -> Self {
        self.stage = stage;
        self
    }

    /// Instance request used by [`ProbeStage::Instance`].
    #[inline]
    pub fn instance_request(mut self, request: InstanceRequest) -> Self {
        self.request = request;
        self
    }

    /// Configured stage.
    #[inline]
    pub fn configured_stage(&self) -> ProbeStage {
        self.stage
    }
}

/// Instance layers, sized and filled with the two-call pattern.
pub fn instance_layers<L: CapabilityApi>(api: &L) -> Result<Vec<vk::LayerProperties>, ProbeError> {
    enumerate_two_call("vk_instance_layer_properties", |count, buffer| {
        api.instance_layer_properties(count, buffer)
    })
}

/// Instance extensions, global when `layer` is `None`.
pub fn instance_extensions<L: CapabilityApi>(
    api: &L,
    layer: Option<&CStr>,
) -> Result<Vec<vk::ExtensionProperties>, ProbeError> {
    enumerate_two_call("vk_instance_extension_properties", |count, buffer| {
        api.instance_extension_properties(layer, count, buffer)
    })
}

/// Run every configured stage against the session's loader, writing the
/// report to `out`. Stops at the first error; whatever was already written
/// stays written. On [`ProbeStage::Instance`] the instance is left in the
/// session, which destroys it when dropped.
pub fn run<L: CapabilityApi, W: Write>(
    session: &mut Session<L>,
    options: &ProbeOptions,
    out: &mut W,
) -> Result<(), ProbeError> {
    let api = session.loader().ok_or(ProbeError::InvalidTransition {
        from: session.state(),
        action: "probe",
    })?;

    let version = api.instance_version().map_err(|result| ProbeError::Query {
        query: "vkEnumerateInstanceVersion",
        result,
    })?;
    debug!("instance version {version}");
    report::write_version(out, version)?;

    if options.stage >= ProbeStage::Layers {
        let layers = instance_layers(api)?;
        debug!("{} instance layers", layers.len());

        if !layers.is_empty() {
            report::write_layer_header(out, layers.len())?;
        }

        for layer in &layers {
            report::write_layer(out, layer)?;

            if options.stage < ProbeStage::Extensions {
                continue;
            }

            let Some(name) = fixed_cstr(&layer.layer_name) else {
                warn!("skipping extensions of a layer with an unterminated name");
                continue;
            };

            let extensions = instance_extensions(api, Some(name))?;
            if !extensions.is_empty() {
                report::write_extensions(out, 2, &extensions)?;
            }
        }
    }

    if options.stage >= ProbeStage::Extensions {
        let extensions = instance_extensions(api, None)?;
        debug!("{} instance extensions", extensions.len());
        report::write_extensions(out, 0, &extensions)?;
    }

    out.flush()?;

    if options.stage >= ProbeStage::Instance {
        session.create_instance(&options.request)?;
        debug!("instance created");
    }

    Ok(())
}

/// Exit status for the outcome of [`run`]: 0 on success, 1 on any error.
#[inline]
pub fn exit_status(result: &Result<(), ProbeError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}
