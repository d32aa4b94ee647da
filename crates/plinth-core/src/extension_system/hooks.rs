use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::extension_system::traits::Extension;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::Result;

/// One `{type, identifier}` pair found by discovery; also the cache format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredExtension {
    #[serde(rename = "type")]
    pub extension_type: String,
    pub identifier: String,
}

/// Ordered, append-only callback list.
///
/// Callbacks run in registration order; the first error stops the rest.
pub struct HookList<F: ?Sized> {
    callbacks: Vec<Box<F>>,
}

impl<F: ?Sized> Default for HookList<F> {
    fn default() -> Self {
        Self { callbacks: Vec::new() }
    }
}

impl<F: ?Sized> fmt::Debug for HookList<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookList").field("len", &self.callbacks.len()).finish()
    }
}

impl<F: ?Sized> HookList<F> {
    pub fn push(&mut self, callback: Box<F>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.callbacks.iter().map(|callback| callback.as_ref())
    }
}

/// Called with everything discovery found
pub type DiscoveredHooks = HookList<dyn Fn(&[DiscoveredExtension]) -> Result<()> + Send + Sync>;
/// Called around a lifecycle phase with the extensions in execution order
pub type PhaseHooks = HookList<dyn Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync>;

impl DiscoveredHooks {
    pub fn fire(&self, discovered: &[DiscoveredExtension]) -> Result<()> {
        for hook in self.iter() {
            hook(discovered)?;
        }
        Ok(())
    }
}

impl PhaseHooks {
    pub fn fire(&self, app: &mut Application, extensions: &[Arc<dyn Extension>]) -> Result<()> {
        for hook in self.iter() {
            hook(app, extensions)?;
        }
        Ok(())
    }
}

/// Every kernel hook point
#[derive(Debug, Default)]
pub struct KernelHooks {
    pub discovered: DiscoveredHooks,
    pub loading: PhaseHooks,
    pub loaded: PhaseHooks,
    pub registering: PhaseHooks,
    pub registered: PhaseHooks,
    pub booting: PhaseHooks,
    pub booted: PhaseHooks,
    pub activating: PhaseHooks,
    pub activated: PhaseHooks,
}

impl KernelHooks {
    pub fn clear(&mut self) {
        self.discovered.clear();
        self.loading.clear();
        self.loaded.clear();
        self.registering.clear();
        self.registered.clear();
        self.booting.clear();
        self.booted.clear();
        self.activating.clear();
        self.activated.clear();
    }
}
