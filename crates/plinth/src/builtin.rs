//! Extensions compiled into the `plinth` binary.
//!
//! Their packages still live on disk under the project's root namespace; the
//! catalog only says which identifiers this binary can instantiate.
use std::sync::Arc;

use log::{debug, info};
use plinth_core::extension_system::error::CapabilityError;
use plinth_core::extension_system::{CoreHooks, ExtensionContext};
use plinth_core::kernel::error::Result;
use plinth_core::{Application, Extension, ExtensionCatalog, ExtensionCore};

pub const BANNER: &str = "Extensions\\Module\\Banner\\Banner";
pub const SLIDER: &str = "Extensions\\Module\\Slider\\Slider";

/// Homepage banner. Ships a `config.json` whose values the host can override.
pub struct Banner {
    context: ExtensionContext,
}

impl CoreHooks for Banner {
    fn config_merged(&self, app: &mut Application) -> Result<()> {
        debug!("Banner config: {:?}", app.config().get("extension_module_banner"));
        Ok(())
    }
}

impl Extension for Banner {
    fn context(&self) -> &ExtensionContext {
        &self.context
    }

    fn configuration(&self, core: &mut ExtensionCore) -> std::result::Result<(), CapabilityError> {
        core.has_config()?;
        Ok(())
    }

    fn activate(&self, app: &mut Application) -> Result<()> {
        let headline: String = app
            .config()
            .get_as("extension_module_banner.headline")
            .unwrap_or_default();
        info!("Banner active, headline '{}'", headline);
        Ok(())
    }
}

/// Image slider; its manifest usually depends on the banner
pub struct Slider {
    context: ExtensionContext,
}

impl CoreHooks for Slider {}

impl Extension for Slider {
    fn context(&self) -> &ExtensionContext {
        &self.context
    }

    fn activate(&self, _app: &mut Application) -> Result<()> {
        info!("Slider active after {} dependency(ies)", self.depends().len());
        Ok(())
    }
}

pub fn catalog() -> ExtensionCatalog {
    let mut catalog = ExtensionCatalog::new();
    catalog.register(BANNER, |context| Arc::new(Banner { context }) as Arc<dyn Extension>);
    catalog.register(SLIDER, |context| Arc::new(Slider { context }) as Arc<dyn Extension>);
    catalog
}
