use log::debug;

use crate::extension_system::core::ExtensionCore;
use crate::extension_system::traits::CoreHooks;
use crate::kernel::bootstrap::Application;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::kernel::provider::{PublishPaths, ServiceProvider};
use crate::storage::config::ConfigData;
use crate::utils::naming::join_identifier;

/// Publishing entry point handed to the booter. Defaults to
/// [`ServiceProvider::publishes`].
pub type PublishCallback<'a> = dyn FnMut(&mut Application, &ServiceProvider, &PublishPaths, &[String]) + 'a;

/// Applies an [`ExtensionCore`]'s declared capabilities to the application.
///
/// Each step is skipped when its capability is absent.
pub struct ExtensionCoreBooter;

impl ExtensionCoreBooter {
    /// Merge config, bind classes, add the view namespace and defer the
    /// console kernel until the application has booted.
    pub fn register<H>(core: &ExtensionCore, app: &mut Application, hooks: Option<&H>) -> Result<()>
    where
        H: CoreHooks + ?Sized,
    {
        if let Some(hooks) = hooks {
            hooks.registering(app)?;
        }
        let options = core.options();

        if options.has_config {
            if let Some(file) = &options.config_file {
                let key = core.config_key()?;
                let data = ConfigData::load(app.files().as_ref(), file)?;
                app.config_mut().merge_defaults(&key, data.to_value());
                debug!("Merged {} into config key '{}'", file.display(), key);
            }
            if let Some(hooks) = hooks {
                hooks.config_merged(app)?;
            }
        }

        if !options.classes.is_empty() {
            for registration in &options.classes {
                app.container_mut()
                    .apply(registration.kind, &registration.key, registration.target.clone())?;
            }
            if let Some(hooks) = hooks {
                hooks.classes_registered(app)?;
            }
        }

        if options.has_view {
            let key = core.config_key()?;
            app.add_view_namespace(&key, core.base_path()?.join(constants::VIEWS_DIR));
            if let Some(hooks) = hooks {
                hooks.views_registered(app)?;
            }
        }

        if options.has_console_kernel {
            if let Some(namespace) = core.namespace() {
                let class = join_identifier(&[namespace.as_str(), constants::CONSOLE_KERNEL_CLASS]);
                if app.classes().exists(&class) {
                    app.booted(move |app| app.register_console_kernel(&class))?;
                    if let Some(hooks) = hooks {
                        hooks.console_kernel_registered(app)?;
                    }
                }
            }
        }

        if let Some(hooks) = hooks {
            hooks.registered(app)?;
        }
        Ok(())
    }

    /// Load translations, defer routes, add the component namespace, and,
    /// inside a provider scope, register commands and publishables.
    pub fn boot<H>(
        core: &ExtensionCore,
        app: &mut Application,
        provider: Option<&mut ServiceProvider>,
        hooks: Option<&H>,
        publish: Option<&mut PublishCallback<'_>>,
    ) -> Result<()>
    where
        H: CoreHooks + ?Sized,
    {
        if let Some(hooks) = hooks {
            hooks.booting(app)?;
        }
        let options = core.options();

        if options.has_translation {
            let key = core.config_key()?;
            app.load_translations_from(core.base_path()?.join(constants::TRANSLATIONS_DIR), &key);
            if let Some(hooks) = hooks {
                hooks.translations_loaded(app)?;
            }
        }

        if options.has_route {
            let route_file = core.base_path()?.join(constants::ROUTE_FILE);
            app.booted(move |app| app.load_routes_from(&route_file))?;
            if let Some(hooks) = hooks {
                hooks.routes_registered(app)?;
            }
        }

        if options.has_component {
            if let Some(namespace) = core.namespace() {
                let key = core.config_key()?;
                let components = join_identifier(&[namespace.as_str(), constants::COMPONENTS_NAMESPACE]);
                app.component_namespace(&components, &key);
                if let Some(hooks) = hooks {
                    hooks.components_registered(app)?;
                }
            }
        }

        if let Some(provider) = provider {
            if !options.commands.is_empty() {
                provider.commands(app, &options.commands);
                if let Some(hooks) = hooks {
                    hooks.commands_registered(app)?;
                }
            }

            let published = match publish {
                Some(callback) => Self::publish_all(core, app, provider, callback)?,
                None => Self::publish_all(
                    core,
                    app,
                    provider,
                    &mut |app: &mut Application, provider: &ServiceProvider, paths: &PublishPaths, groups: &[String]| {
                        provider.publishes(app, paths, groups)
                    },
                )?,
            };
            if published {
                if let Some(hooks) = hooks {
                    hooks.publishables_registered(app)?;
                }
            }
        }

        if let Some(hooks) = hooks {
            hooks.booted(app)?;
        }
        Ok(())
    }

    /// Hand every publish set to `publish`; reports whether anything was offered
    fn publish_all(
        core: &ExtensionCore,
        app: &mut Application,
        provider: &ServiceProvider,
        publish: &mut PublishCallback<'_>,
    ) -> Result<bool> {
        let options = core.options();
        let mut published = false;

        for set in options.publishables.values() {
            publish(app, provider, &set.paths, &set.groups);
            published = true;
        }

        for dependency in &options.dependency_publishables {
            let paths = app
                .publishes()
                .paths_for(&dependency.provider, dependency.group.as_deref());
            if paths.is_empty() {
                debug!("Provider '{}' has nothing to publish", dependency.provider);
                continue;
            }
            let groups: Vec<String> = dependency.group.iter().cloned().collect();
            publish(app, provider, &paths, &groups);
            published = true;
        }

        if options.has_view && options.is_publishable_view {
            let key = core.config_key()?;
            let mut paths = PublishPaths::new();
            paths.insert(
                core.base_path()?.join(constants::VIEWS_DIR),
                app.base_path().join(constants::VIEWS_PUBLISH_DIR).join(&key),
            );
            publish(app, provider, &paths, &[format!("{}-views", key)]);
            published = true;
        }

        if options.has_asset {
            let key = core.config_key()?;
            let mut paths = PublishPaths::new();
            paths.insert(
                core.base_path()?.join(constants::ASSETS_DIR),
                app.base_path().join(constants::ASSETS_PUBLISH_DIR).join(&key),
            );
            publish(app, provider, &paths, &[format!("{}-assets", key)]);
            published = true;
        }

        Ok(published)
    }
}
