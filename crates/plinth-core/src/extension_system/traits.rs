use std::path::Path;

use serde_json::{Value, json};

use crate::extension_system::booter::ExtensionCoreBooter;
use crate::extension_system::catalog::ExtensionContext;
use crate::extension_system::core::ExtensionCore;
use crate::extension_system::descriptor::{ExtensionDescriptor, FieldDefinition};
use crate::extension_system::error::CapabilityError;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::Result;
use crate::kernel::provider::ServiceProvider;

/// Callbacks the booter fires around each capability step.
///
/// Step hooks only fire when their step ran; `registering`/`registered` and
/// `booting`/`booted` always fire.
pub trait CoreHooks {
    fn registering(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn config_merged(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn classes_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn views_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn console_kernel_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn booting(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn translations_loaded(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn routes_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn components_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn commands_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn publishables_registered(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn booted(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }
}

/// The extension contract.
///
/// Implementors expose their [`ExtensionContext`] and declare capabilities in
/// [`configuration`](Extension::configuration); the provided `register` and
/// `boot` apply those capabilities through [`ExtensionCoreBooter`].
pub trait Extension: CoreHooks + Send + Sync {
    fn context(&self) -> &ExtensionContext;

    fn identifier(&self) -> &str {
        &self.context().identifier
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &self.context().descriptor
    }

    fn base_path(&self) -> &Path {
        &self.context().base_path
    }

    fn priority(&self) -> i64 {
        self.descriptor().priority
    }

    fn depends(&self) -> &[String] {
        &self.descriptor().depends
    }

    fn fields(&self) -> &[FieldDefinition] {
        &self.descriptor().fields
    }

    /// Declare capabilities on a core already carrying name, type and base path
    fn configuration(&self, _core: &mut ExtensionCore) -> std::result::Result<(), CapabilityError> {
        Ok(())
    }

    /// Build and configure this extension's core
    fn core(&self, app: &Application) -> Result<ExtensionCore> {
        let descriptor = self.descriptor();
        let mut core = ExtensionCore::for_application(app);
        core.set_name(&descriptor.name)?
            .set_type(&descriptor.extension_type)
            .set_base_path(self.base_path())?;
        self.configuration(&mut core)?;
        Ok(core)
    }

    fn register(&self, app: &mut Application) -> Result<()> {
        let core = self.core(app)?;
        ExtensionCoreBooter::register(&core, app, Some(self))
    }

    fn boot(&self, app: &mut Application) -> Result<()> {
        let core = self.core(app)?;
        let mut provider = ServiceProvider::new(self.identifier());
        ExtensionCoreBooter::boot(&core, app, Some(&mut provider), Some(self), None)
    }

    /// Must tolerate being called more than once
    fn activate(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    /// Metadata plus the serialized form definition
    fn spec(&self) -> Value {
        let mut spec = serde_json::to_value(self.descriptor()).unwrap_or_else(|_| json!({}));
        if let Value::Object(map) = &mut spec {
            map.insert("identifier".to_string(), Value::String(self.identifier().to_string()));
        }
        spec
    }
}

/// Extension with no behaviour beyond its manifest
#[derive(Debug, Clone)]
pub struct ManifestExtension {
    context: ExtensionContext,
}

impl ManifestExtension {
    pub fn new(context: ExtensionContext) -> Self {
        Self { context }
    }
}

impl CoreHooks for ManifestExtension {}

impl Extension for ManifestExtension {
    fn context(&self) -> &ExtensionContext {
        &self.context
    }
}
