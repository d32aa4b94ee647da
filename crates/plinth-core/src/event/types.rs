use std::any::Any;

use crate::event::Event;

/// Lifecycle events raised by the extension kernel.
///
/// Each variant carries the number of extensions the phase touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionEvent {
    /// Discovery finished, either by scanning or by replaying the cache
    DiscoveryCompleted { count: usize, from_cache: bool },
    /// Installed extensions were instantiated
    InstalledLoaded { count: usize },
    Registering { count: usize },
    Registered { count: usize },
    Booting { count: usize },
    Booted { count: usize },
    Activating { count: usize },
    Activated { count: usize },
}

impl ExtensionEvent {
    pub fn count(&self) -> usize {
        match self {
            ExtensionEvent::DiscoveryCompleted { count, .. }
            | ExtensionEvent::InstalledLoaded { count }
            | ExtensionEvent::Registering { count }
            | ExtensionEvent::Registered { count }
            | ExtensionEvent::Booting { count }
            | ExtensionEvent::Booted { count }
            | ExtensionEvent::Activating { count }
            | ExtensionEvent::Activated { count } => *count,
        }
    }
}

impl Event for ExtensionEvent {
    fn name(&self) -> &'static str {
        match self {
            ExtensionEvent::DiscoveryCompleted { .. } => "extension.discovered",
            ExtensionEvent::InstalledLoaded { .. } => "extension.installed_loaded",
            ExtensionEvent::Registering { .. } => "extension.registering",
            ExtensionEvent::Registered { .. } => "extension.registered",
            ExtensionEvent::Booting { .. } => "extension.booting",
            ExtensionEvent::Booted { .. } => "extension.booted",
            ExtensionEvent::Activating { .. } => "extension.activating",
            ExtensionEvent::Activated { .. } => "extension.activated",
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
