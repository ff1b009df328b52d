//! In-memory capability API for unit tests.
use crate::{ApiVersion, CapabilityApi, InstanceRequest};
use ash::vk;
use std::{
    cell::{Cell, RefCell},
    ffi::{CStr, CString},
    os::raw::c_char,
    rc::Rc,
};

pub(crate) fn fixed_array<const N: usize>(text: &str) -> [c_char; N] {
    assert!(text.len() < N, "{text:?} does not fit in {N} bytes");
    let mut raw = [0; N];
    for (dst, &src) in raw.iter_mut().zip(text.as_bytes()) {
        *dst = src as c_char;
    }
    raw
}

pub(crate) fn layer(name: &str, spec_version: u32, implementation_version: u32, description: &str) -> vk::LayerProperties {
    vk::LayerProperties {
        layer_name: fixed_array(name),
        spec_version,
        implementation_version,
        description: fixed_array(description),
    }
}

pub(crate) fn extension(name: &str, spec_version: u32) -> vk::ExtensionProperties {
    vk::ExtensionProperties {
        extension_name: fixed_array(name),
        spec_version,
    }
}

fn two_call<T: Copy>(source: &[T], count: &mut u32, buffer: Option<&mut [T]>) -> vk::Result {
    match buffer {
        None => {
            *count = source.len() as u32;
            vk::Result::SUCCESS
        }
        Some(buffer) => {
            let written = (*count as usize).min(buffer.len()).min(source.len());
            buffer[..written].copy_from_slice(&source[..written]);
            *count = written as u32;
            if written < source.len() {
                vk::Result::INCOMPLETE
            } else {
                vk::Result::SUCCESS
            }
        }
    }
}

/// Counts its own destruction.
#[derive(Debug)]
pub(crate) struct MockInstance {
    destroyed: Rc<Cell<u32>>,
}

impl Drop for MockInstance {
    fn drop(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

pub(crate) struct MockApi {
    version: u32,
    layers: Vec<vk::LayerProperties>,
    layer_extensions: Vec<(CString, Vec<vk::ExtensionProperties>)>,
    extensions: Vec<vk::ExtensionProperties>,
    reject_instance: Option<vk::Result>,
    destroyed: Rc<Cell<u32>>,
    fill_calls: Cell<u32>,
    filters: RefCell<Vec<Option<CString>>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        MockApi {
            version: 0x0040_3000,
            layers: Vec::new(),
            layer_extensions: Vec::new(),
            extensions: Vec::new(),
            reject_instance: None,
            destroyed: Rc::new(Cell::new(0)),
            fill_calls: Cell::new(0),
            filters: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn layer(mut self, layer: vk::LayerProperties, extensions: Vec<vk::ExtensionProperties>) -> Self {
        let name = crate::enumerate::fixed_cstr(&layer.layer_name)
            .expect("layer name")
            .to_owned();
        self.layers.push(layer);
        self.layer_extensions.push((name, extensions));
        self
    }

    pub(crate) fn extension(mut self, extension: vk::ExtensionProperties) -> Self {
        self.extensions.push(extension);
        self
    }

    pub(crate) fn reject_instance(mut self, result: vk::Result) -> Self {
        self.reject_instance = Some(result);
        self
    }

    pub(crate) fn destroyed_counter(&self) -> Rc<Cell<u32>> {
        self.destroyed.clone()
    }

    /// Number of enumeration calls that were handed a buffer.
    pub(crate) fn fill_calls(&self) -> u32 {
        self.fill_calls.get()
    }

    /// Filters passed to the extension query, in call order.
    pub(crate) fn filters(&self) -> Vec<Option<CString>> {
        self.filters.borrow().clone()
    }

    fn note_fill<T>(&self, buffer: &Option<&mut [T]>) {
        if buffer.is_some() {
            self.fill_calls.set(self.fill_calls.get() + 1);
        }
    }
}

impl CapabilityApi for MockApi {
    type Instance = MockInstance;

    fn instance_version(&self) -> Result<ApiVersion, vk::Result> {
        Ok(ApiVersion::from_raw(self.version))
    }

    fn instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        self.note_fill(&properties);
        two_call(&self.layers, count, properties)
    }

    fn instance_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        self.note_fill(&properties);
        self.filters.borrow_mut().push(layer.map(CStr::to_owned));

        match layer {
            None => two_call(&self.extensions, count, properties),
            Some(layer) => match self.layer_extensions.iter().find(|(name, _)| name.as_c_str() == layer) {
                Some((_, extensions)) => two_call(extensions, count, properties),
                None => vk::Result::ERROR_LAYER_NOT_PRESENT,
            },
        }
    }

    fn create_instance(&self, _request: &InstanceRequest) -> Result<MockInstance, vk::Result> {
        match self.reject_instance {
            Some(result) => Err(result),
            None => Ok(MockInstance {
                destroyed: self.destroyed.clone(),
            }),
        }
    }
}
