//! Errors that abort the probe.
use crate::LifecycleState;
use ash::{vk, LoadingError};
use std::{ffi::NulError, io};
use thiserror::Error;

/// Every way the probe can fail. All of them are fatal for the binary.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The Vulkan loader library or its entry points could not be resolved.
    #[error("Failed to initialize the Vulkan loader: {0}")]
    LoaderInit(#[from] LoadingError),
    /// The host could not provide memory for an enumeration buffer.
    #[error("Failed to allocate memory for {buffer}")]
    Allocation {
        /// Name of the buffer being sized.
        buffer: &'static str,
        /// Number of records that were requested.
        count: usize,
    },
    /// The driver rejected the instance configuration.
    #[error("Failed to create Vulkan instance: {0}")]
    InstanceCreation(vk::Result),
    /// An enumeration entry point returned an error code.
    #[error("{query} failed: {result}")]
    Query {
        /// The query that failed.
        query: &'static str,
        /// The error it returned.
        result: vk::Result,
    },
    /// A lifecycle action was attempted from a state that does not allow it.
    #[error("cannot {action} while the session is {from}")]
    InvalidTransition {
        /// The state the session was in.
        from: LifecycleState,
        /// The rejected action.
        action: &'static str,
    },
    /// A name passed to the instance request contained a NUL byte.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NulError),
    /// The report could not be written.
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl ProbeError {
    /// Process exit status for this error. There are no per-kind codes.
    #[inline]
    pub fn exit_code(&self) -> u8 {
        1
    }
}
