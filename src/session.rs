//! Instance lifecycle.
use crate::{CapabilityApi, InstanceRequest, ProbeError};
use log::debug;
use std::fmt;

/// Where a [`Session`] is in its life. Transitions only go forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// No loader has been resolved yet.
    Uninitialized,
    /// The loader entry points are resolved, no instance exists.
    LoaderReady,
    /// An instance has been created and not yet destroyed.
    InstanceCreated,
    /// Terminal.
    Destroyed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::LoaderReady => "loader ready",
            LifecycleState::InstanceCreated => "instance created",
            LifecycleState::Destroyed => "destroyed",
        })
    }
}

/// Owns the loader and, once created, the single instance.
///
/// The instance is destroyed exactly once: by [`Session::destroy`] or, at the
/// latest, when the session is dropped, whichever exit path is taken.
pub struct Session<L: CapabilityApi> {
    // Declared before `loader` so it can never outlive it.
    instance: Option<L::Instance>,
    loader: Option<L>,
    state: LifecycleState,
}

impl<L: CapabilityApi> Session<L> {
    /// A session with no loader.
    #[inline]
    pub fn new() -> Self {
        Session {
            instance: None,
            loader: None,
            state: LifecycleState::Uninitialized,
        }
    }

    /// A session whose loader is already resolved.
    #[inline]
    pub fn with_loader(loader: L) -> Self {
        Session {
            instance: None,
            loader: Some(loader),
            state: LifecycleState::LoaderReady,
        }
    }

    /// Resolve the loader with `init`. Only valid on an uninitialized session.
    pub fn bootstrap(
        &mut self,
        init: impl FnOnce() -> Result<L, ProbeError>,
    ) -> Result<(), ProbeError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(self.invalid("resolve the loader"));
        }

        self.loader = Some(init()?);
        self.state = LifecycleState::LoaderReady;
        Ok(())
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The loader, unless the session is uninitialized or destroyed.
    #[inline]
    pub fn loader(&self) -> Option<&L> {
        match self.state {
            LifecycleState::LoaderReady | LifecycleState::InstanceCreated => self.loader.as_ref(),
            LifecycleState::Uninitialized | LifecycleState::Destroyed => None,
        }
    }

    /// The live instance, if any.
    #[inline]
    pub fn instance(&self) -> Option<&L::Instance> {
        self.instance.as_ref()
    }

    /// Create the instance. Only valid once the loader is ready and before
    /// any instance exists.
    pub fn create_instance(&mut self, request: &InstanceRequest) -> Result<&L::Instance, ProbeError> {
        if self.state != LifecycleState::LoaderReady {
            return Err(self.invalid("create an instance"));
        }

        let loader = self.loader.as_ref().ok_or(ProbeError::InvalidTransition {
            from: self.state,
            action: "create an instance",
        })?;

        debug!("creating instance: {request:?}");
        let instance = loader
            .create_instance(request)
            .map_err(ProbeError::InstanceCreation)?;

        self.state = LifecycleState::InstanceCreated;
        Ok(self.instance.insert(instance))
    }

    /// Destroy the instance if there is one and move to
    /// [`LifecycleState::Destroyed`]. A no-op on an uninitialized or already
    /// destroyed session.
    pub fn destroy(&mut self) {
        match self.state {
            LifecycleState::Uninitialized | LifecycleState::Destroyed => return,
            LifecycleState::LoaderReady | LifecycleState::InstanceCreated => {}
        }

        drop(self.instance.take());

        self.state = LifecycleState::Destroyed;
        debug!("session destroyed");
    }

    fn invalid(&self, action: &'static str) -> ProbeError {
        ProbeError::InvalidTransition {
            from: self.state,
            action,
        }
    }
}

impl<L: CapabilityApi> Default for Session<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: CapabilityApi> Drop for Session<L> {
    fn drop(&mut self) {
        self.destroy();
    }
}
