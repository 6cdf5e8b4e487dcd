//! The `Component` trait implemented by every pluggable simulation unit.

use std::any::Any;
use std::fmt;

use crate::stg_error::StgError;

/// A named, configurable unit of simulation behaviour (mesh, solver,
/// boundary condition, ...).
///
/// Components are built by a factory, owned by the component register, and
/// driven through the lifecycle `build → initialise → execute* → destroy`.
/// Each hook runs at most once per component, except `execute`, which runs
/// once per step.
pub trait Component: Any + Send + Sync + fmt::Debug {
    /// Instance name, unique within a register.
    fn name(&self) -> &str;

    /// Concrete type name, as used in the factory key.
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Allocate internal data once all components exist.
    fn build(&mut self) -> Result<(), StgError> {
        Ok(())
    }

    /// Fill initial values.
    fn initialise(&mut self) -> Result<(), StgError> {
        Ok(())
    }

    /// Advance one step.
    fn execute(&mut self) -> Result<(), StgError> {
        Ok(())
    }

    /// Release resources before the component is dropped.
    fn destroy(&mut self) -> Result<(), StgError> {
        Ok(())
    }
}

/// Stable index of a component in its register.
///
/// Handles stay valid for the register's lifetime because registers are
/// append-only. Components refer to their dependencies through handles
/// rather than by sharing ownership.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHandle(pub(crate) usize);

impl ComponentHandle {
    /// Position of the component in the register.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
