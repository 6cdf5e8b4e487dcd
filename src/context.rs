//! Context: one simulation's configuration, factories and live components.
//!
//! A context is an explicit object rather than process-wide state; a rank
//! typically owns exactly one. Assembly follows the configuration:
//!
//! ```text
//! plugins:    [ "Erosion" ]
//! components: { mesh: { Type: Regular, Category: Mesh },
//!               stokes: { Type: Stokes, Category: Solver, Mesh: mesh } }
//! ```
//!
//! Each `components` entry names a factory by `Type` (and `Category`,
//! defaulting to `"Component"`). Components are built in configuration order;
//! a constructor that requires another component causes it to be built
//! first.

use crate::dictionary::Dictionary;
use crate::firewall::Firewall;
use crate::registry::plugin::{self, Plugin};
use crate::registry::{
    BuildContext, Component, ComponentHandle, ComponentRegister, ComponentRepository,
    DependencyResolver,
};
use crate::stg_error::StgError;

/// Struct of component entries, keyed by instance name.
pub const COMPONENTS_KEY: &str = "components";
/// Factory type of a component entry.
pub const TYPE_KEY: &str = "Type";
/// Factory category of a component entry.
pub const CATEGORY_KEY: &str = "Category";
/// Category used when an entry names none.
pub const DEFAULT_CATEGORY: &str = "Component";
/// Number of `execute` steps [`Context::run`] performs.
pub const MAX_STEPS_KEY: &str = "maxTimeSteps";

#[derive(Debug)]
pub struct Context<'f> {
    dictionary: Dictionary,
    repository: ComponentRepository<'f>,
    register: ComponentRegister,
}

impl<'f> Context<'f> {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary,
            repository: ComponentRepository::new(),
            register: ComponentRegister::new(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn repository(&self) -> &ComponentRepository<'f> {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut ComponentRepository<'f> {
        &mut self.repository
    }

    pub fn register(&self) -> &ComponentRegister {
        &self.register
    }

    /// Load the plugins the configuration lists, from `available`.
    pub fn load_plugins(&mut self, available: &[&'f dyn Plugin]) -> Result<Vec<String>, StgError> {
        plugin::load_plugins(&mut self.repository, available, &self.dictionary)
    }

    /// Build every component in the `components` struct that is not built
    /// yet. Returns how many were added.
    ///
    /// # Errors
    /// The first configuration or constructor error; components built
    /// before it stay registered.
    pub fn construct_components(&mut self) -> Result<usize, StgError> {
        let Some(entries) = self.dictionary.get_opt(COMPONENTS_KEY) else {
            log::debug!("no `{COMPONENTS_KEY}` entry; nothing to construct");
            return Ok(0);
        };
        let components = entries
            .as_struct()
            .ok_or_else(|| StgError::NotAStruct(COMPONENTS_KEY.to_string()))?;
        let before = self.register.len();
        let mut assembler = Assembler {
            components,
            repository: &self.repository,
            register: &mut self.register,
            in_progress: Vec::new(),
        };
        for name in components.keys() {
            assembler.resolve(name)?;
        }
        let added = self.register.len() - before;
        log::debug!("constructed {added} components");
        Ok(added)
    }

    /// The component called `name`, as concrete type `T`.
    pub fn component<T: Component>(&self, name: &str) -> Result<&T, StgError> {
        self.register.downcast(name)
    }

    pub fn component_mut<T: Component>(&mut self, name: &str) -> Result<&mut T, StgError> {
        self.register.downcast_mut(name)
    }

    pub fn handle(&self, name: &str) -> Option<ComponentHandle> {
        self.register.handle(name)
    }

    pub fn build(&mut self) -> Result<(), StgError> {
        self.register.build_all()
    }

    pub fn initialise(&mut self) -> Result<(), StgError> {
        self.register.initialise_all()
    }

    /// One step over every component.
    pub fn execute(&mut self) -> Result<(), StgError> {
        self.register.execute_all()
    }

    pub fn destroy(&mut self) -> Result<(), StgError> {
        self.register.destroy_all()
    }

    /// Construct, build, initialise, run `maxTimeSteps` steps (default 1),
    /// then destroy. Returns the number of steps run.
    pub fn run(&mut self) -> Result<u64, StgError> {
        let steps = self.dictionary.get_ulong_or(MAX_STEPS_KEY, 1);
        self.construct_components()?;
        self.build()?;
        self.initialise()?;
        for _ in 0..steps {
            self.execute()?;
        }
        self.destroy()?;
        Ok(steps)
    }

    /// [`run`](Self::run), aborting the rank on any error.
    pub fn run_or_abort(&mut self) -> u64 {
        self.run().firewall("Context::run")
    }
}

/// Builds components on demand while `construct_components` walks the
/// configuration.
struct Assembler<'a, 'f> {
    components: &'a Dictionary,
    repository: &'a ComponentRepository<'f>,
    register: &'a mut ComponentRegister,
    /// Names whose constructors are currently running, outermost first.
    in_progress: Vec<String>,
}

impl DependencyResolver for Assembler<'_, '_> {
    fn resolve(&mut self, name: &str) -> Result<ComponentHandle, StgError> {
        if let Some(handle) = self.register.handle(name) {
            return Ok(handle);
        }
        if let Some(pos) = self.in_progress.iter().position(|n| n == name) {
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(name.to_string());
            return Err(StgError::CyclicDependency(chain.join(" -> ")));
        }

        let components = self.components;
        let config = components
            .get_opt(name)
            .ok_or_else(|| StgError::MissingComponentConfig(name.to_string()))?
            .as_struct()
            .ok_or_else(|| StgError::NotAStruct(format!("{COMPONENTS_KEY}.{name}")))?;
        let type_name = config.get_string(TYPE_KEY).map_err(|err| match err {
            StgError::MissingKey(_) => StgError::MissingKey(format!("{name}.{TYPE_KEY}")),
            other => other,
        })?;
        let category = config.get_string_or(CATEGORY_KEY, DEFAULT_CATEGORY);

        let repository = self.repository;
        self.in_progress.push(name.to_string());
        let built = {
            let mut ctx = BuildContext::with_resolver(name, config, &mut *self);
            repository.build(&category, &type_name, &mut ctx)
        };
        self.in_progress.pop();
        self.register.add(name, built?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Value;
    use crate::registry::{ComponentFactory, StaticPlugin};
    use std::any::Any;

    #[derive(Debug)]
    struct Mesh {
        name: String,
        size: u32,
        steps: u32,
    }

    #[derive(Debug)]
    struct Solver {
        name: String,
        mesh: ComponentHandle,
    }

    impl Component for Mesh {
        fn name(&self) -> &str {
            &self.name
        }
        fn type_name(&self) -> &str {
            "Regular"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
        fn execute(&mut self) -> Result<(), StgError> {
            self.steps += 1;
            Ok(())
        }
    }

    impl Component for Solver {
        fn name(&self) -> &str {
            &self.name
        }
        fn type_name(&self) -> &str {
            "Stokes"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn make_mesh(ctx: &mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError> {
        Ok(Box::new(Mesh {
            name: ctx.name().to_string(),
            size: ctx.config().get_uint_or("size", 8),
            steps: 0,
        }))
    }

    fn make_solver(ctx: &mut BuildContext<'_>) -> Result<Box<dyn Component>, StgError> {
        let mesh = ctx.require("Mesh")?;
        Ok(Box::new(Solver {
            name: ctx.name().to_string(),
            mesh,
        }))
    }

    static FACTORIES: [ComponentFactory; 2] = [
        ComponentFactory::new("Mesh", "Regular", make_mesh),
        ComponentFactory::new("Solver", "Stokes", make_solver),
    ];
    static CORE: StaticPlugin = StaticPlugin::new("Core", &FACTORIES);

    fn entry(pairs: &[(&str, Value)]) -> Value {
        Value::Struct(pairs.iter().cloned().collect())
    }

    fn config(components: Vec<(&str, Value)>) -> Dictionary {
        let mut cfg = Dictionary::new();
        cfg.add("plugins", Value::List(vec!["Core".into()]));
        cfg.add(COMPONENTS_KEY, Value::Struct(components.into_iter().collect()));
        cfg
    }

    #[test]
    fn dependencies_are_built_first() {
        let cfg = config(vec![
            (
                "stokes",
                entry(&[
                    ("Type", "Stokes".into()),
                    ("Category", "Solver".into()),
                    ("Mesh", "mesh".into()),
                ]),
            ),
            (
                "mesh",
                entry(&[
                    ("Type", "Regular".into()),
                    ("Category", "Mesh".into()),
                    ("size", Value::UInt(16)),
                ]),
            ),
        ]);
        let mut ctx = Context::new(cfg);
        assert_eq!(ctx.load_plugins(&[&CORE]).unwrap(), ["Core"]);
        assert_eq!(ctx.construct_components().unwrap(), 2);

        let names: Vec<_> = ctx.register().iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["mesh", "stokes"]);
        let solver = ctx.component::<Solver>("stokes").unwrap();
        assert_eq!(Some(solver.mesh), ctx.handle("mesh"));
        assert_eq!(ctx.component::<Mesh>("mesh").unwrap().size, 16);
        assert!(matches!(
            ctx.component::<Mesh>("stokes"),
            Err(StgError::ComponentDowncast { .. })
        ));
        // already constructed: nothing new
        assert_eq!(ctx.construct_components().unwrap(), 0);
    }

    #[test]
    fn cycles_are_reported_with_their_chain() {
        let cfg = config(vec![
            (
                "a",
                entry(&[
                    ("Type", "Stokes".into()),
                    ("Category", "Solver".into()),
                    ("Mesh", "b".into()),
                ]),
            ),
            (
                "b",
                entry(&[
                    ("Type", "Stokes".into()),
                    ("Category", "Solver".into()),
                    ("Mesh", "a".into()),
                ]),
            ),
        ]);
        let mut ctx = Context::new(cfg);
        ctx.load_plugins(&[&CORE]).unwrap();
        assert_eq!(
            ctx.construct_components(),
            Err(StgError::CyclicDependency("a -> b -> a".into()))
        );
        assert!(ctx.register().is_empty());
    }

    #[test]
    fn configuration_errors() {
        let mut ctx = Context::new(config(vec![(
            "stokes",
            entry(&[
                ("Type", "Stokes".into()),
                ("Category", "Solver".into()),
                ("Mesh", "ghost".into()),
            ]),
        )]));
        ctx.load_plugins(&[&CORE]).unwrap();
        assert_eq!(
            ctx.construct_components(),
            Err(StgError::MissingComponentConfig("ghost".into()))
        );

        let mut ctx = Context::new(config(vec![("m", entry(&[("Category", "Mesh".into())]))]));
        ctx.load_plugins(&[&CORE]).unwrap();
        assert_eq!(
            ctx.construct_components(),
            Err(StgError::MissingKey("m.Type".into()))
        );

        // no Category: looked up under the default category
        let mut ctx = Context::new(config(vec![("m", entry(&[("Type", "Regular".into())]))]));
        ctx.load_plugins(&[&CORE]).unwrap();
        assert_eq!(
            ctx.construct_components(),
            Err(StgError::UnknownComponent {
                category: DEFAULT_CATEGORY.into(),
                type_name: "Regular".into()
            })
        );
    }

    #[test]
    fn run_executes_configured_steps() {
        let mut cfg = config(vec![(
            "mesh",
            entry(&[("Type", "Regular".into()), ("Category", "Mesh".into())]),
        )]);
        cfg.add(MAX_STEPS_KEY, Value::UInt(3));
        let mut ctx = Context::new(cfg);
        ctx.load_plugins(&[&CORE]).unwrap();
        assert_eq!(ctx.run_or_abort(), 3);
        assert_eq!(ctx.component::<Mesh>("mesh").unwrap().steps, 3);
        assert_eq!(ctx.register().steps(), 3);
    }

    #[test]
    #[should_panic(expected = "Context::run")]
    fn run_or_abort_panics_on_configuration_error() {
        let mut ctx = Context::new(config(vec![(
            "mesh",
            entry(&[("Type", "Regular".into()), ("Category", "Mesh".into())]),
        )]));
        // plugin never loaded: factory unknown
        ctx.run_or_abort();
    }
}
