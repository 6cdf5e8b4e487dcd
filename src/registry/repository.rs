//! ComponentRepository: resolves (category, type) keys to constructors.
//!
//! The repository borrows its factories for `'f`; it never owns them, nor
//! the components it builds. A factory therefore outlives every `build`
//! call by construction. Plugins typically declare factories as `static`
//! items.

use std::fmt;

use hashbrown::HashMap;

use super::component::{Component, ComponentHandle};
use crate::dictionary::Dictionary;
use crate::stg_error::StgError;

/// Constructor invoked by [`ComponentRepository::build`].
pub type Constructor = fn(&mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError>;

/// A (category, type) → constructor registration.
#[derive(Clone, Copy)]
pub struct ComponentFactory {
    category: &'static str,
    type_name: &'static str,
    constructor: Constructor,
}

impl ComponentFactory {
    pub const fn new(
        category: &'static str,
        type_name: &'static str,
        constructor: Constructor,
    ) -> Self {
        Self {
            category,
            type_name,
            constructor,
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("category", &self.category)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Resolves a component name to a handle, building it if needed.
pub trait DependencyResolver {
    fn resolve(&mut self, name: &str) -> Result<ComponentHandle, StgError>;
}

/// Everything a constructor may consult while building one instance.
pub struct BuildContext<'a> {
    name: &'a str,
    config: &'a Dictionary,
    resolver: Option<&'a mut dyn DependencyResolver>,
}

impl<'a> BuildContext<'a> {
    /// Context for a standalone build: dependencies cannot be resolved.
    pub fn new(name: &'a str, config: &'a Dictionary) -> Self {
        Self {
            name,
            config,
            resolver: None,
        }
    }

    /// Context whose dependencies are resolved through `resolver`.
    pub fn with_resolver(
        name: &'a str,
        config: &'a Dictionary,
        resolver: &'a mut dyn DependencyResolver,
    ) -> Self {
        Self {
            name,
            config,
            resolver: Some(resolver),
        }
    }

    /// Instance name of the component being built.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The component's own configuration entries.
    pub fn config(&self) -> &'a Dictionary {
        self.config
    }

    /// Resolve the component named by the configuration entry `key`.
    ///
    /// # Errors
    /// [`StgError::MissingKey`] if `key` is absent, or whatever resolving
    /// the named component reports.
    pub fn require(&mut self, key: &str) -> Result<ComponentHandle, StgError> {
        let dependency = self.config.get_string(key)?;
        self.require_named(&dependency)
    }

    /// Like [`require`](Self::require), but an absent `key` yields `None`.
    pub fn optional(&mut self, key: &str) -> Result<Option<ComponentHandle>, StgError> {
        match self.config.get_opt(key) {
            Some(value) => {
                let dependency = value.as_string(key)?;
                self.require_named(&dependency).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Resolve the component called `name`.
    pub fn require_named(&mut self, name: &str) -> Result<ComponentHandle, StgError> {
        log::trace!("{} requires `{name}`", self.name);
        match self.resolver.as_deref_mut() {
            Some(resolver) => resolver.resolve(name),
            None => Err(StgError::MissingComponentConfig(name.to_string())),
        }
    }
}

/// Registered component factories, indexed by (category, type).
#[derive(Debug, Default)]
pub struct ComponentRepository<'f> {
    factories: Vec<&'f ComponentFactory>,
    index: HashMap<&'static str, HashMap<&'static str, usize>>,
    plugins: Vec<String>,
}

impl<'f> ComponentRepository<'f> {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            index: HashMap::new(),
            plugins: Vec::new(),
        }
    }

    /// Register `factory`.
    ///
    /// # Errors
    /// [`StgError::DuplicateFactory`] if its (category, type) pair is
    /// already registered; the existing registration is kept.
    pub fn register(&mut self, factory: &'f ComponentFactory) -> Result<(), StgError> {
        let by_type = self.index.entry(factory.category).or_default();
        if by_type.contains_key(factory.type_name) {
            return Err(StgError::DuplicateFactory {
                category: factory.category.to_string(),
                type_name: factory.type_name.to_string(),
            });
        }
        by_type.insert(factory.type_name, self.factories.len());
        self.factories.push(factory);
        log::debug!(
            "registered component factory {}/{}",
            factory.category,
            factory.type_name
        );
        Ok(())
    }

    /// Factory registered for (category, type).
    pub fn lookup(&self, category: &str, type_name: &str) -> Option<&'f ComponentFactory> {
        let idx = *self.index.get(category)?.get(type_name)?;
        Some(self.factories[idx])
    }

    pub fn contains(&self, category: &str, type_name: &str) -> bool {
        self.lookup(category, type_name).is_some()
    }

    /// Build a new instance with the factory registered for (category, type).
    ///
    /// # Errors
    /// [`StgError::UnknownComponent`] if nothing is registered for the pair
    /// (a configuration error), or whatever the constructor reports.
    pub fn build(
        &self,
        category: &str,
        type_name: &str,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Box<dyn Component>, StgError> {
        let factory =
            self.lookup(category, type_name)
                .ok_or_else(|| StgError::UnknownComponent {
                    category: category.to_string(),
                    type_name: type_name.to_string(),
                })?;
        log::debug!("building `{}` as {category}/{type_name}", ctx.name());
        (factory.constructor)(ctx)
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'f ComponentFactory> + '_ {
        self.factories.iter().copied()
    }

    /// Distinct categories, in order of first registration.
    pub fn categories(&self) -> Vec<&'static str> {
        let mut seen: Vec<&'static str> = Vec::new();
        for f in &self.factories {
            if !seen.contains(&f.category) {
                seen.push(f.category);
            }
        }
        seen
    }

    /// Record that plugin `name` has registered its factories. Returns
    /// `false` if it had already been recorded.
    pub fn mark_plugin_loaded(&mut self, name: &str) -> bool {
        if self.plugins.iter().any(|p| p == name) {
            return false;
        }
        self.plugins.push(name.to_string());
        true
    }

    /// Plugins loaded so far, in load order.
    pub fn loaded_plugins(&self) -> impl Iterator<Item = &str> + '_ {
        self.plugins.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Probe {
        name: String,
        made_by: &'static str,
    }

    impl Component for Probe {
        fn name(&self) -> &str {
            &self.name
        }
        fn type_name(&self) -> &str {
            self.made_by
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn make_regular(ctx: &mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError> {
        Ok(Box::new(Probe {
            name: ctx.name().to_string(),
            made_by: "Regular",
        }))
    }

    fn make_dirichlet(ctx: &mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError> {
        Ok(Box::new(Probe {
            name: ctx.name().to_string(),
            made_by: "Dirichlet",
        }))
    }

    fn make_dependent(ctx: &mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError> {
        ctx.require("Mesh")?;
        make_regular(ctx)
    }

    static REGULAR: ComponentFactory = ComponentFactory::new("Mesh", "Regular", make_regular);
    static DIRICHLET: ComponentFactory = ComponentFactory::new("BC", "Dirichlet", make_dirichlet);

    #[test]
    fn build_invokes_only_the_matching_constructor() {
        let mut repo = ComponentRepository::new();
        repo.register(&REGULAR).unwrap();
        repo.register(&DIRICHLET).unwrap();
        let cfg = Dictionary::new();

        let mesh = repo
            .build("Mesh", "Regular", &mut BuildContext::new("mesh", &cfg))
            .unwrap();
        let probe = mesh.as_any().downcast_ref::<Probe>().unwrap();
        assert_eq!(probe.made_by, "Regular");
        assert_eq!(probe.name, "mesh");

        let bc = repo
            .build("BC", "Dirichlet", &mut BuildContext::new("walls", &cfg))
            .unwrap();
        assert_eq!(bc.type_name(), "Dirichlet");
    }

    #[test]
    fn unknown_pair_is_a_configuration_error() {
        let mut repo = ComponentRepository::new();
        repo.register(&REGULAR).unwrap();
        let cfg = Dictionary::new();
        let err = repo
            .build("Mesh", "Dirichlet", &mut BuildContext::new("m", &cfg))
            .unwrap_err();
        assert_eq!(
            err,
            StgError::UnknownComponent {
                category: "Mesh".into(),
                type_name: "Dirichlet".into()
            }
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let again = ComponentFactory::new("Mesh", "Regular", make_dirichlet);
        let other = ComponentFactory::new("Swarm", "Regular", make_regular);
        let mut repo = ComponentRepository::new();
        repo.register(&REGULAR).unwrap();
        assert!(matches!(
            repo.register(&again),
            Err(StgError::DuplicateFactory { .. })
        ));
        assert_eq!(repo.len(), 1);
        // same type name under another category is a different key
        repo.register(&other).unwrap();
        assert_eq!(repo.categories(), ["Mesh", "Swarm"]);
    }

    #[test]
    fn standalone_context_cannot_resolve_dependencies() {
        let dependent = ComponentFactory::new("Solver", "Stokes", make_dependent);
        let mut repo = ComponentRepository::new();
        repo.register(&dependent).unwrap();
        let mut cfg = Dictionary::new();
        cfg.add("Mesh", "mesh");
        let err = repo
            .build("Solver", "Stokes", &mut BuildContext::new("stokes", &cfg))
            .unwrap_err();
        assert_eq!(err, StgError::MissingComponentConfig("mesh".into()));
    }

    #[test]
    fn plugins_are_recorded_once() {
        let mut repo = ComponentRepository::new();
        assert!(repo.mark_plugin_loaded("Erosion"));
        assert!(!repo.mark_plugin_loaded("Erosion"));
        assert_eq!(repo.loaded_plugins().collect::<Vec<_>>(), ["Erosion"]);
    }
}
