use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::kernel::bootstrap::Application;

/// Source -> destination pairs offered for publishing
pub type PublishPaths = BTreeMap<PathBuf, PathBuf>;

/// Everything providers have offered for publishing, indexed by provider,
/// by group, and by (provider, group).
#[derive(Debug, Clone, Default)]
pub struct PublishRegistry {
    by_provider: BTreeMap<String, PublishPaths>,
    by_group: BTreeMap<String, PublishPaths>,
    by_provider_group: BTreeMap<(String, String), PublishPaths>,
}

impl PublishRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, provider: &str, paths: &PublishPaths, groups: &[String]) {
        self.by_provider
            .entry(provider.to_string())
            .or_default()
            .extend(paths.clone());
        for group in groups {
            self.by_group
                .entry(group.clone())
                .or_default()
                .extend(paths.clone());
            self.by_provider_group
                .entry((provider.to_string(), group.clone()))
                .or_default()
                .extend(paths.clone());
        }
    }

    /// Paths a provider offers, optionally narrowed to one group
    pub fn paths_for(&self, provider: &str, group: Option<&str>) -> PublishPaths {
        let found = match group {
            Some(group) => self
                .by_provider_group
                .get(&(provider.to_string(), group.to_string())),
            None => self.by_provider.get(provider),
        };
        found.cloned().unwrap_or_default()
    }

    pub fn group(&self, group: &str) -> PublishPaths {
        self.by_group.get(group).cloned().unwrap_or_default()
    }

    pub fn groups(&self) -> Vec<String> {
        self.by_group.keys().cloned().collect()
    }

    pub fn providers(&self) -> Vec<String> {
        self.by_provider.keys().cloned().collect()
    }
}

/// Provider scope an extension boots inside of.
///
/// Commands and publishables can only be registered through a provider, so
/// they show up in the console command list and publish groups under the
/// provider's name.
#[derive(Debug, Clone)]
pub struct ServiceProvider {
    name: String,
    commands: Vec<String>,
}

impl ServiceProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_commands(&self) -> &[String] {
        &self.commands
    }

    pub fn commands(&mut self, app: &mut Application, commands: &[String]) {
        for command in commands {
            if !self.commands.contains(command) {
                self.commands.push(command.clone());
            }
            app.add_command(command);
        }
    }

    pub fn publishes(&self, app: &mut Application, paths: &PublishPaths, groups: &[String]) {
        app.publishes_mut().publish(&self.name, paths, groups);
    }
}
