//! Plugins: bundles of component factories selected by configuration.
//!
//! The configuration's `plugins` list names the plugins to load, either as
//! plain strings or as structs carrying a `Type` member. Each named plugin
//! must be among those the caller makes available; its factories are then
//! registered with the repository.

use super::repository::{ComponentFactory, ComponentRepository};
use crate::dictionary::{Dictionary, Value};
use crate::stg_error::StgError;

/// Configuration key listing the plugins to load.
pub const PLUGINS_KEY: &str = "plugins";

/// A named set of component factories.
pub trait Plugin: Sync {
    fn name(&self) -> &str;
    fn factories(&self) -> &[ComponentFactory];
}

/// A plugin whose factories are known at compile time.
#[derive(Debug)]
pub struct StaticPlugin {
    name: &'static str,
    factories: &'static [ComponentFactory],
}

impl StaticPlugin {
    pub const fn new(name: &'static str, factories: &'static [ComponentFactory]) -> Self {
        Self { name, factories }
    }
}

impl Plugin for StaticPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn factories(&self) -> &[ComponentFactory] {
        self.factories
    }
}

/// Register every factory of `plugin`. Returns `false`, registering
/// nothing, if a plugin of the same name was already loaded.
///
/// # Errors
/// [`StgError::DuplicateFactory`] if any of the plugin's keys is already
/// registered, or repeated within the plugin. The repository is left
/// untouched and the plugin is not marked loaded.
pub fn load_plugin<'f>(
    repository: &mut ComponentRepository<'f>,
    plugin: &'f dyn Plugin,
) -> Result<bool, StgError> {
    if repository.loaded_plugins().any(|p| p == plugin.name()) {
        log::warn!("plugin `{}` already loaded; skipping", plugin.name());
        return Ok(false);
    }
    let factories = plugin.factories();
    for (i, factory) in factories.iter().enumerate() {
        let (category, type_name) = (factory.category(), factory.type_name());
        let repeated = factories[..i]
            .iter()
            .any(|f| f.category() == category && f.type_name() == type_name);
        if repeated || repository.contains(category, type_name) {
            return Err(StgError::DuplicateFactory {
                category: category.to_string(),
                type_name: type_name.to_string(),
            });
        }
    }
    for factory in factories {
        repository.register(factory)?;
    }
    repository.mark_plugin_loaded(plugin.name());
    log::debug!(
        "loaded plugin `{}` ({} factories)",
        plugin.name(),
        factories.len()
    );
    Ok(true)
}

/// Names listed under [`PLUGINS_KEY`] in `config`, in order.
pub fn configured_plugins(config: &Dictionary) -> Result<Vec<String>, StgError> {
    let Some(list) = config.get_opt(PLUGINS_KEY) else {
        return Ok(Vec::new());
    };
    list.elements()
        .map(|entry| match entry {
            Value::Struct(d) => d.get_string("Type"),
            other => other.as_string(PLUGINS_KEY),
        })
        .collect()
}

/// Load the plugins named in `config` from `available`.
///
/// Returns the names of the plugins newly loaded.
///
/// # Errors
/// [`StgError::UnknownPlugin`] if a configured name is not available, or
/// [`StgError::DuplicateFactory`] if two plugins register the same key.
pub fn load_plugins<'f>(
    repository: &mut ComponentRepository<'f>,
    available: &[&'f dyn Plugin],
    config: &Dictionary,
) -> Result<Vec<String>, StgError> {
    let mut loaded = Vec::new();
    for name in configured_plugins(config)? {
        let plugin = available
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| StgError::UnknownPlugin(name.clone()))?;
        if load_plugin(repository, plugin)? {
            loaded.push(name);
        }
    }
    Ok(loaded)
}
