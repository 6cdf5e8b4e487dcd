//! ComponentRegister: the live components of one context, with their
//! lifecycle state.

use super::component::{Component, ComponentHandle};
use super::register::{NamedObject, NamedObjectRegister};
use crate::stg_error::StgError;

impl NamedObject for Box<dyn Component> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// How far a component has progressed through its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Built by its factory; nothing else has run.
    #[default]
    Constructed,
    Built,
    Initialised,
    Destroyed,
}

/// Owns every live component, in construction order.
#[derive(Debug, Default)]
pub struct ComponentRegister {
    objects: NamedObjectRegister<Box<dyn Component>>,
    phases: Vec<Phase>,
    steps: u64,
}

impl ComponentRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `component` under `name`.
    ///
    /// # Errors
    /// [`StgError::DuplicateName`] if `name` is taken;
    /// [`StgError::Invariant`] if the component calls itself something else.
    pub fn add(
        &mut self,
        name: &str,
        component: Box<dyn Component>,
    ) -> Result<ComponentHandle, StgError> {
        let own = NamedObject::name(&component);
        if own != name {
            return Err(StgError::invariant(
                "ComponentRegister",
                format!("component `{own}` registered as `{name}`"),
            ));
        }
        let idx = self.objects.add_named(name, component)?;
        self.phases.push(Phase::Constructed);
        log::debug!("registered component `{name}` at {idx}");
        Ok(ComponentHandle(idx))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn handle(&self, name: &str) -> Option<ComponentHandle> {
        self.objects.get_index(name).map(ComponentHandle)
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Component> {
        self.objects.get_by_name(name).map(|c| &**c)
    }

    pub fn get(&self, handle: ComponentHandle) -> Option<&dyn Component> {
        self.objects.get_by_index(handle.0).map(|c| &**c)
    }

    pub fn get_mut(&mut self, handle: ComponentHandle) -> Option<&mut dyn Component> {
        self.objects
            .get_by_index_mut(handle.0)
            .map(|c| &mut **c as &mut dyn Component)
    }

    pub fn name_of(&self, handle: ComponentHandle) -> Option<&str> {
        self.objects.name_of(handle.0)
    }

    /// The component called `name`, as concrete type `T`.
    ///
    /// # Errors
    /// [`StgError::UnknownObject`] if absent, [`StgError::ComponentDowncast`]
    /// if it is some other type.
    pub fn downcast<T: Component>(&self, name: &str) -> Result<&T, StgError> {
        let component = self
            .lookup(name)
            .ok_or_else(|| StgError::UnknownObject(name.to_string()))?;
        component
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| StgError::ComponentDowncast {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn downcast_mut<T: Component>(&mut self, name: &str) -> Result<&mut T, StgError> {
        let component = self
            .objects
            .get_by_name_mut(name)
            .ok_or_else(|| StgError::UnknownObject(name.to_string()))?;
        component
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| StgError::ComponentDowncast {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Same as [`downcast`](Self::downcast), addressed by handle.
    pub fn downcast_handle<T: Component>(&self, handle: ComponentHandle) -> Result<&T, StgError> {
        let name = self
            .name_of(handle)
            .ok_or_else(|| StgError::UnknownObject(handle.to_string()))?;
        self.downcast(name)
    }

    pub fn phase(&self, handle: ComponentHandle) -> Option<Phase> {
        self.phases.get(handle.0).copied()
    }

    /// `(name, component)` pairs in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Component)> + '_ {
        self.objects.iter().map(|(n, c)| (n, &**c))
    }

    /// Number of completed [`execute_all`](Self::execute_all) steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn advance(&mut self, idx: usize, target: Phase) -> Result<(), StgError> {
        let current = self.phases[idx];
        if current == Phase::Destroyed {
            let name = self.objects.name_of(idx).unwrap_or_default().to_string();
            return Err(StgError::invariant(
                "ComponentRegister",
                format!("`{name}` used after destroy"),
            ));
        }
        if current >= target {
            return Ok(());
        }
        let Some(component) = self.objects.get_by_index_mut(idx) else {
            return Err(StgError::invariant(
                "ComponentRegister",
                format!("phase recorded for missing component {idx}"),
            ));
        };
        if current < Phase::Built {
            component.build()?;
            self.phases[idx] = Phase::Built;
        }
        if target >= Phase::Initialised {
            component.initialise()?;
            self.phases[idx] = Phase::Initialised;
        }
        Ok(())
    }

    /// Run `build` on every component not yet built.
    pub fn build_all(&mut self) -> Result<(), StgError> {
        log::debug!("building {} components", self.len());
        for idx in 0..self.len() {
            self.advance(idx, Phase::Built)?;
        }
        Ok(())
    }

    /// Run `initialise` on every component not yet initialised. Components
    /// not yet built are all built first.
    pub fn initialise_all(&mut self) -> Result<(), StgError> {
        self.build_all()?;
        log::debug!("initialising {} components", self.len());
        for idx in 0..self.len() {
            self.advance(idx, Phase::Initialised)?;
        }
        Ok(())
    }

    /// Run one `execute` step over every component. Components not yet
    /// initialised are all initialised first, in register order.
    pub fn execute_all(&mut self) -> Result<(), StgError> {
        self.initialise_all()?;
        for idx in 0..self.len() {
            if let Some(component) = self.objects.get_by_index_mut(idx) {
                component.execute()?;
            }
        }
        self.steps += 1;
        log::debug!("completed step {}", self.steps);
        Ok(())
    }

    /// Run `destroy` on every live component, in reverse construction order.
    pub fn destroy_all(&mut self) -> Result<(), StgError> {
        log::debug!("destroying {} components", self.len());
        for idx in (0..self.len()).rev() {
            if self.phases[idx] == Phase::Destroyed {
                continue;
            }
            if let Some(component) = self.objects.get_by_index_mut(idx) {
                component.destroy()?;
            }
            self.phases[idx] = Phase::Destroyed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn boxed(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn Component> {
            Box::new(Recorder {
                name: name.to_string(),
                log: Arc::clone(log),
            })
        }

        fn note(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{what}:{}", self.name));
        }
    }

    impl Component for Recorder {
        fn name(&self) -> &str {
            &self.name
        }
        fn type_name(&self) -> &str {
            "Recorder"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
        fn build(&mut self) -> Result<(), StgError> {
            self.note("build");
            Ok(())
        }
        fn initialise(&mut self) -> Result<(), StgError> {
            self.note("init");
            Ok(())
        }
        fn execute(&mut self) -> Result<(), StgError> {
            self.note("exec");
            Ok(())
        }
        fn destroy(&mut self) -> Result<(), StgError> {
            self.note("destroy");
            Ok(())
        }
    }

    #[test]
    fn lifecycle_runs_each_phase_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ComponentRegister::new();
        let a = reg.add("a", Recorder::boxed("a", &log)).unwrap();
        reg.add("b", Recorder::boxed("b", &log)).unwrap();

        reg.build_all().unwrap();
        reg.build_all().unwrap();
        reg.execute_all().unwrap();
        reg.destroy_all().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                "build:a", "build:b", "init:a", "init:b", "exec:a", "exec:b", "destroy:b",
                "destroy:a"
            ]
        );
        assert_eq!(reg.phase(a), Some(Phase::Destroyed));
        assert_eq!(reg.steps(), 1);
        assert!(reg.execute_all().is_err());
    }

    #[test]
    fn execute_initialises_the_whole_register_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ComponentRegister::new();
        reg.add("a", Recorder::boxed("a", &log)).unwrap();
        reg.add("b", Recorder::boxed("b", &log)).unwrap();

        reg.execute_all().unwrap();
        reg.execute_all().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                "build:a", "build:b", "init:a", "init:b", "exec:a", "exec:b", "exec:a", "exec:b"
            ]
        );
        assert_eq!(reg.steps(), 2);
    }

    #[test]
    fn register_name_must_match_component_name() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ComponentRegister::new();
        let err = reg.add("mesh", Recorder::boxed("grid", &log)).unwrap_err();
        assert!(matches!(err, StgError::Invariant { .. }));
        assert!(reg.is_empty());
        assert!(reg.handle("mesh").is_none());
    }

    #[test]
    fn typed_access() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ComponentRegister::new();
        let h = reg.add("mesh", Recorder::boxed("mesh", &log)).unwrap();
        assert_eq!(reg.downcast::<Recorder>("mesh").unwrap().name, "mesh");
        assert_eq!(reg.downcast_handle::<Recorder>(h).unwrap().name, "mesh");
        assert!(matches!(
            reg.downcast::<Recorder>("nope"),
            Err(StgError::UnknownObject(_))
        ));
        assert_eq!(reg.handle("mesh"), Some(h));
        assert!(reg.add("mesh", Recorder::boxed("mesh", &log)).is_err());
    }
}
