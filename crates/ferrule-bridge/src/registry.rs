//! Type descriptor registry
//!
//! Maps type name → descriptor. The registry is an explicit object the
//! host creates once and passes by reference — there is no hidden
//! process-wide singleton. Entries are created lazily the first time a
//! type crosses the boundary and are never removed; after the
//! registration phase every access is a cheap shared read.

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::descriptor::TypeDescriptor;
use crate::error::{BridgeError, BridgeResult};
use crate::ops::{NativeType, TypedOps};
use crate::wrapper::Wrapper;

/// Process-scoped store of type descriptors.
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<FxHashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration and lookup
    // ========================================================================

    /// Register a descriptor under its name.
    ///
    /// Idempotent and first-writer-wins: if the name is already taken the
    /// existing descriptor is returned unchanged. A re-registration that
    /// carries a *different* operation table is still ignored, but a
    /// warning is logged — silently discarding a conflicting table can
    /// mask bugs in the caller's registration order.
    pub fn register(&self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let mut types = self.types.write();
        match types.entry(descriptor.name().to_string()) {
            Entry::Occupied(entry) => {
                let existing = entry.get().clone();
                if !existing.same_ops(&descriptor) {
                    warn!(
                        type_name = descriptor.name(),
                        "re-registration with a different operation table ignored"
                    );
                }
                existing
            }
            Entry::Vacant(entry) => {
                debug!(type_name = descriptor.name(), "registered native type");
                let descriptor = Arc::new(descriptor);
                entry.insert(descriptor.clone());
                descriptor
            }
        }
    }

    /// Register a [`NativeType`] implementation under `name`, deriving the
    /// operation table through the typed layer.
    pub fn register_native<T: NativeType>(
        &self,
        name: impl Into<String>,
        docs: impl Into<String>,
    ) -> Arc<TypeDescriptor> {
        self.register(
            TypeDescriptor::builder(name, Arc::new(TypedOps::<T>::new()))
                .docs(docs)
                .build(),
        )
    }

    /// Look up a descriptor by name. Pure read, no side effects.
    pub fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(name).cloned()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Names of all registered types
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }

    // ========================================================================
    // Boundary entry points
    // ========================================================================

    /// Wrap an existing native value, transferring ownership to the wrapper.
    ///
    /// The wrapper will destroy `handle` on finalization. Fails with
    /// [`BridgeError::UnknownType`] if `type_name` is unregistered, in
    /// which case `handle` stays with the caller. To wrap without giving
    /// up ownership use [`TypeRegistry::wrap_borrowed`].
    ///
    /// # Safety
    /// `handle` must be a live, owned handle of the registered type, not
    /// already owned by another wrapper.
    pub unsafe fn wrap_existing(&self, type_name: &str, handle: *mut ()) -> BridgeResult<Wrapper> {
        let descriptor = self.lookup_or_unknown(type_name)?;
        let handle = NonNull::new(handle).expect("null native handle");
        Ok(Wrapper::owning(descriptor, handle))
    }

    /// Wrap an externally owned native value without taking ownership.
    ///
    /// The wrapper never destroys `handle`; the caller keeps that
    /// responsibility and must keep the value alive for the wrapper's
    /// lifetime.
    ///
    /// # Safety
    /// `handle` must be a live handle of the registered type and must
    /// outlive the returned wrapper.
    pub unsafe fn wrap_borrowed(&self, type_name: &str, handle: *mut ()) -> BridgeResult<Wrapper> {
        let descriptor = self.lookup_or_unknown(type_name)?;
        let handle = NonNull::new(handle).expect("null native handle");
        Ok(Wrapper::borrowing(descriptor, handle))
    }

    /// Wrap an independent copy of a native value.
    ///
    /// Dispatches the type's copy operation; the wrapper owns the copy and
    /// `handle` remains untouched with the caller.
    ///
    /// # Safety
    /// `handle` must be a live handle of the registered type.
    pub unsafe fn wrap_copy(&self, type_name: &str, handle: *const ()) -> BridgeResult<Wrapper> {
        let descriptor = self.lookup_or_unknown(type_name)?;
        assert!(!handle.is_null(), "null native handle");
        let copy = descriptor.ops().copy(handle);
        let copy = NonNull::new(copy).expect("copy operation returned null");
        Ok(Wrapper::owning(descriptor, copy))
    }

    /// Wrap a Rust value directly. Safe typed counterpart of
    /// [`TypeRegistry::wrap_existing`]: the value moves onto the heap and
    /// the wrapper owns it.
    ///
    /// # Panics
    /// If `type_name` was registered for a different native type — that is
    /// a registration-order bug in the caller, not a runtime condition.
    pub fn wrap_value<T: NativeType>(&self, type_name: &str, value: T) -> BridgeResult<Wrapper> {
        let descriptor = self.lookup_or_unknown(type_name)?;
        assert_eq!(
            descriptor.ops().native_type_id(),
            Some(TypeId::of::<T>()),
            "'{type_name}' is registered for a different native type"
        );
        let handle = TypedOps::into_handle(value);
        // into_handle never returns null; Box allocations are non-null.
        let handle = NonNull::new(handle).expect("null native handle");
        Ok(Wrapper::owning(descriptor, handle))
    }

    fn lookup_or_unknown(&self, type_name: &str) -> BridgeResult<Arc<TypeDescriptor>> {
        self.lookup(type_name)
            .ok_or_else(|| BridgeError::UnknownType(type_name.to_string()))
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
