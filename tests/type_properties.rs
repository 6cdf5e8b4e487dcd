//! Compile-time checks on the public types.

use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};
use stg_core::container::{Array, Container, Shallow};
use stg_core::decomp::{ExplicitDecomposition, RegularDecomposition};
use stg_core::dictionary::{Dictionary, Value};
use stg_core::registry::{ComponentHandle, ComponentRegister, ComponentRepository, Shared};
use stg_core::StgError;

// configuration and decompositions move freely between threads
assert_impl_all!(Dictionary: Send, Sync, Clone);
assert_impl_all!(Value: Send, Sync, Clone);
assert_impl_all!(RegularDecomposition: Send, Sync, Clone);
assert_impl_all!(ExplicitDecomposition: Send, Sync, Clone);
assert_impl_all!(StgError: Send, Sync, std::error::Error);

// live components may be shared behind a lock
assert_impl_all!(ComponentRegister: Send, Sync);
assert_impl_all!(Shared<ComponentRepository<'static>>: Send, Sync);

// a handle is a plain index
assert_eq_size!(ComponentHandle, usize);

// views are copyable borrows, never owners of a second buffer
assert_impl_all!(Shallow<'static, Array<u8>>: Copy);
assert_eq_size!(Shallow<'static, Array<u8>>, &'static Array<u8>);
assert_not_impl_any!(ComponentRegister: Clone);

#[test]
fn shallow_views_copy_without_owning() {
    let array: Array<u8> = (0..8).collect();
    let view = array.shallow_copy();
    let again = view;
    assert_eq!(view.buffer_ptr(), again.buffer_ptr());
    assert!(!again.is_owner());
    assert!(std::ptr::eq(again.owner(), &array));
}
