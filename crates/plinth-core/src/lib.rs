pub mod event;
pub mod extension_system;
pub mod kernel;
pub mod storage;
pub mod utils;

pub use event::{Event, ExtensionEvent};
pub use extension_system::{
    Extension, ExtensionCatalog, ExtensionCore, ExtensionCoreBooter, ExtensionInstaller, ExtensionKernel,
    ExtensionRegistry,
};
pub use kernel::error::Error as KernelError;
pub use kernel::{Application, KernelSettings};
pub use storage::StorageProvider;
