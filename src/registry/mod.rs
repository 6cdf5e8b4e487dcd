//! Component construction and lookup.
//!
//! - [`ComponentRepository`] maps (category, type) keys to constructors.
//! - [`NamedObjectRegister`] maps names to objects with stable indices.
//! - [`ComponentRegister`] owns built components and drives their lifecycle.
//! - [`plugin`] loads the factory bundles named in configuration.
//! - [`Shared`] guards any of these for multithreaded embedders.

pub mod component;
pub mod component_register;
pub mod plugin;
pub mod register;
pub mod repository;
pub mod shared;

pub use component::{Component, ComponentHandle};
pub use component_register::{ComponentRegister, Phase};
pub use plugin::{Plugin, StaticPlugin, load_plugin, load_plugins};
pub use register::{NamedObject, NamedObjectRegister};
pub use repository::{
    BuildContext, ComponentFactory, ComponentRepository, Constructor, DependencyResolver,
};
pub use shared::Shared;
