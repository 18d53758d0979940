//! Wrapper objects — the handles the host runtime sees
//!
//! A [`Wrapper`] is lightweight: an opaque handle to the native value, a
//! lazily computed hash cache, and a shared reference to the type's
//! descriptor. Ownership is a tagged state, not a convention: only an
//! `Owned` wrapper ever destroys its handle, a `Borrowed` wrapper never
//! does, and `Finalized` is terminal.
//!
//! The host runtime's reclamation hook is expected to call
//! [`Wrapper::finalize`] exactly once per live wrapper; repeated calls are
//! absorbed as no-ops to protect against reclamation races, and `Drop`
//! routes through the same path so a wrapper the host forgets cannot leak.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::mem;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{BridgeError, BridgeResult};
use crate::ops::{CompareOp, NativeType, OpError, Stability};

// ============================================================================
// Handle state
// ============================================================================

/// Ownership state of the wrapped native handle.
#[derive(Debug)]
enum HandleState {
    /// This wrapper is responsible for the handle and will destroy it
    Owned(NonNull<()>),
    /// The handle belongs to someone else; never destroyed from here
    Borrowed(NonNull<()>),
    /// Handle released; any further dereference is a programming error
    Finalized,
}

// ============================================================================
// Wrapper
// ============================================================================

/// Boundary handle carrying one native value into the host runtime.
pub struct Wrapper {
    state: HandleState,
    cached_hash: Cell<Option<u64>>,
    descriptor: Arc<TypeDescriptor>,
}

// The native handle is opaque; the typed construction path requires
// `NativeType: Send`, and erased tables document the same contract.
// No `Sync`: the hash cache is a `Cell`, so sharing one wrapper across
// threads requires external synchronization from the host runtime.
unsafe impl Send for Wrapper {}

impl Wrapper {
    /// Wrapper that owns `handle` and destroys it on finalization.
    pub(crate) fn owning(descriptor: Arc<TypeDescriptor>, handle: NonNull<()>) -> Self {
        Self {
            state: HandleState::Owned(handle),
            cached_hash: Cell::new(None),
            descriptor,
        }
    }

    /// Wrapper over an externally owned handle; never destroys it.
    pub(crate) fn borrowing(descriptor: Arc<TypeDescriptor>, handle: NonNull<()>) -> Self {
        Self {
            state: HandleState::Borrowed(handle),
            cached_hash: Cell::new(None),
            descriptor,
        }
    }

    /// The live handle, or `None` once finalized.
    fn live_handle(&self) -> Option<NonNull<()>> {
        match self.state {
            HandleState::Owned(p) | HandleState::Borrowed(p) => Some(p),
            HandleState::Finalized => None,
        }
    }

    /// The live handle. Dereferencing a finalized wrapper is a programming
    /// error in the host's reclamation discipline, caught here.
    fn handle(&self) -> *const () {
        self.live_handle()
            .expect("wrapper used after finalize")
            .as_ptr()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Descriptor of the wrapped type
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Registered name of the wrapped type
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Whether this wrapper owns its native handle
    pub fn owns_native(&self) -> bool {
        matches!(self.state, HandleState::Owned(_))
    }

    /// Whether this wrapper has been finalized
    pub fn is_finalized(&self) -> bool {
        matches!(self.state, HandleState::Finalized)
    }

    // ========================================================================
    // Protocol dispatch
    // ========================================================================

    /// Human-readable representation of the wrapped value.
    ///
    /// Always defined — render is a mandatory operation.
    pub fn stringify(&self) -> String {
        unsafe { self.descriptor.ops().render(self.handle()) }
    }

    /// Evaluate an ordering operator between two wrappers.
    ///
    /// Both wrappers must wrap the same registered type. A type without the
    /// compare capability reports [`BridgeError::UnsupportedOperation`],
    /// never a default ordering; a comparable type may still report
    /// [`BridgeError::Incomparable`] for a pair it cannot order.
    pub fn compare_with(&self, other: &Wrapper, op: CompareOp) -> BridgeResult<bool> {
        if !Arc::ptr_eq(&self.descriptor, &other.descriptor) {
            return Err(BridgeError::DescriptorMismatch {
                left: self.type_name().to_string(),
                right: other.type_name().to_string(),
            });
        }
        unsafe {
            self.descriptor
                .ops()
                .compare(self.handle(), other.handle(), op)
        }
        .map_err(|e| match e {
            OpError::Unsupported => BridgeError::UnsupportedOperation {
                type_name: self.type_name().to_string(),
                operation: "compare",
            },
            OpError::Incomparable => BridgeError::Incomparable {
                type_name: self.type_name().to_string(),
                op,
            },
        })
    }

    /// Hash of the wrapped value.
    ///
    /// A type without the hash capability reports
    /// [`BridgeError::UnsupportedOperation`] — the host must treat the
    /// wrapper as unhashable rather than fall back to identity hashing.
    /// The result is cached only when the type reports its values as
    /// immutable; mutable values are rehashed on every call.
    pub fn hash_value(&self) -> BridgeResult<u64> {
        if let Some(cached) = self.cached_hash.get() {
            return Ok(cached);
        }
        let outcome = unsafe { self.descriptor.ops().hash(self.handle()) }.map_err(|e| match e {
            OpError::Unsupported | OpError::Incomparable => BridgeError::UnsupportedOperation {
                type_name: self.type_name().to_string(),
                operation: "hash",
            },
        })?;
        if outcome.stability == Stability::Immutable {
            self.cached_hash.set(Some(outcome.value));
        }
        Ok(outcome.value)
    }

    // ========================================================================
    // Typed access
    // ========================================================================

    /// Borrow the native value, when the descriptor was registered for `T`
    /// through the typed layer. Returns `None` for a type mismatch, a
    /// hand-written erased table, or a finalized wrapper.
    pub fn downcast_ref<T: NativeType>(&self) -> Option<&T> {
        if self.descriptor.ops().native_type_id() != Some(TypeId::of::<T>()) {
            return None;
        }
        let handle = self.live_handle()?;
        Some(unsafe { &*(handle.as_ptr() as *const T) })
    }

    /// Mutably borrow the native value. Same conditions as
    /// [`Wrapper::downcast_ref`]; mutating also invalidates any cached hash.
    pub fn downcast_mut<T: NativeType>(&mut self) -> Option<&mut T> {
        if self.descriptor.ops().native_type_id() != Some(TypeId::of::<T>()) {
            return None;
        }
        let handle = self.live_handle()?;
        self.cached_hash.set(None);
        Some(unsafe { &mut *(handle.as_ptr() as *mut T) })
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    /// Release the wrapped handle.
    ///
    /// Owned handles are destroyed through the operation table, exactly
    /// once; borrowed handles are left untouched. Calling this on an
    /// already-finalized wrapper is a no-op.
    pub fn finalize(&mut self) {
        match mem::replace(&mut self.state, HandleState::Finalized) {
            HandleState::Owned(p) => unsafe {
                self.descriptor.ops().destroy(p.as_ptr());
            },
            HandleState::Borrowed(_) | HandleState::Finalized => {}
        }
        self.cached_hash.set(None);
    }
}

impl Drop for Wrapper {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl std::fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrapper")
            .field("type", &self.type_name())
            .field("state", &self.state)
            .finish()
    }
}

// ============================================================================
// Type-tag check
// ============================================================================

/// Whether `candidate` is a wrapper produced by this mechanism.
///
/// Type-tag check only; never fails, returns `false` for anything else.
pub fn is_wrapper_instance(candidate: &dyn Any) -> bool {
    candidate.is::<Wrapper>()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{HashOutcome, TypedOps};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Counts drops of the native value so destroy calls are observable.
    struct Tracked {
        value: i64,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    impl NativeType for Tracked {
        fn deep_copy(&self) -> Self {
            Tracked {
                value: self.value,
                drops: self.drops.clone(),
            }
        }

        fn render(&self) -> String {
            format!("Tracked({})", self.value)
        }

        fn compare(&self, other: &Self, op: CompareOp) -> Result<bool, OpError> {
            Ok(op.evaluate(self.value.cmp(&other.value)))
        }

        fn hash_value(&self) -> Result<HashOutcome, OpError> {
            Ok(HashOutcome::immutable(self.value as u64))
        }
    }

    fn tracked_descriptor() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::builder("Tracked", Arc::new(TypedOps::<Tracked>::new())).build(),
        )
    }

    fn owned(desc: &Arc<TypeDescriptor>, value: i64, drops: &Arc<AtomicUsize>) -> Wrapper {
        let handle = TypedOps::into_handle(Tracked {
            value,
            drops: drops.clone(),
        });
        Wrapper::owning(desc.clone(), NonNull::new(handle).unwrap())
    }

    #[test]
    fn test_finalize_destroys_exactly_once() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut w = owned(&desc, 1, &drops);

        w.finalize();
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
        assert!(w.is_finalized());

        // Repeated finalize and the Drop backstop are both no-ops now.
        w.finalize();
        drop(w);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_drop_finalizes_owned_wrapper() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let w = owned(&desc, 2, &drops);
        drop(w);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_borrowed_wrapper_never_destroys() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut native = Box::new(Tracked {
            value: 3,
            drops: drops.clone(),
        });

        let handle = NonNull::new(&mut *native as *mut Tracked as *mut ()).unwrap();
        let mut w = Wrapper::borrowing(desc, handle);
        assert!(!w.owns_native());
        assert_eq!(w.stringify(), "Tracked(3)");

        w.finalize();
        drop(w);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 0);

        drop(native);
        assert_eq!(drops.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_immutable_hash_is_cached() {
        struct CountingHash {
            calls: Arc<AtomicUsize>,
        }
        impl NativeType for CountingHash {
            fn deep_copy(&self) -> Self {
                CountingHash {
                    calls: self.calls.clone(),
                }
            }
            fn render(&self) -> String {
                "CountingHash".to_string()
            }
            fn hash_value(&self) -> Result<HashOutcome, OpError> {
                self.calls.fetch_add(1, AtomicOrdering::SeqCst);
                Ok(HashOutcome::immutable(0xfeed))
            }
        }

        let desc = Arc::new(
            TypeDescriptor::builder("CountingHash", Arc::new(TypedOps::<CountingHash>::new()))
                .build(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = TypedOps::into_handle(CountingHash {
            calls: calls.clone(),
        });
        let w = Wrapper::owning(desc, NonNull::new(handle).unwrap());

        assert_eq!(w.hash_value().unwrap(), 0xfeed);
        assert_eq!(w.hash_value().unwrap(), 0xfeed);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_mutable_hash_recomputes() {
        struct Counter(u64);
        impl NativeType for Counter {
            fn deep_copy(&self) -> Self {
                Counter(self.0)
            }
            fn render(&self) -> String {
                format!("Counter({})", self.0)
            }
            fn hash_value(&self) -> Result<HashOutcome, OpError> {
                Ok(HashOutcome::mutable(self.0))
            }
        }

        let desc = Arc::new(
            TypeDescriptor::builder("Counter", Arc::new(TypedOps::<Counter>::new())).build(),
        );
        let handle = TypedOps::into_handle(Counter(10));
        let mut w = Wrapper::owning(desc, NonNull::new(handle).unwrap());

        assert_eq!(w.hash_value().unwrap(), 10);
        w.downcast_mut::<Counter>().unwrap().0 = 20;
        assert_eq!(w.hash_value().unwrap(), 20);
    }

    #[test]
    fn test_compare_requires_same_descriptor() {
        let desc_a = tracked_descriptor();
        let desc_b = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let a = owned(&desc_a, 1, &drops);
        let b = owned(&desc_b, 2, &drops);

        match a.compare_with(&b, CompareOp::Lt) {
            Err(BridgeError::DescriptorMismatch { .. }) => {}
            other => panic!("expected DescriptorMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_compare_dispatches() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let a = owned(&desc, 1, &drops);
        let b = owned(&desc, 2, &drops);

        assert_eq!(a.compare_with(&b, CompareOp::Lt), Ok(true));
        assert_eq!(a.compare_with(&b, CompareOp::Eq), Ok(false));
        assert_eq!(b.compare_with(&a, CompareOp::Ge), Ok(true));
    }

    #[test]
    fn test_downcast_checks_type_identity() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let w = owned(&desc, 42, &drops);

        assert_eq!(w.downcast_ref::<Tracked>().unwrap().value, 42);

        struct Other;
        impl NativeType for Other {
            fn deep_copy(&self) -> Self {
                Other
            }
            fn render(&self) -> String {
                "Other".to_string()
            }
        }
        assert!(w.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn test_is_wrapper_instance() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let w = owned(&desc, 1, &drops);

        assert!(is_wrapper_instance(&w));
        assert!(!is_wrapper_instance(&"not a wrapper"));
        assert!(!is_wrapper_instance(&7u64));
    }

    #[test]
    #[should_panic(expected = "wrapper used after finalize")]
    fn test_stringify_after_finalize_is_caught() {
        let desc = tracked_descriptor();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut w = owned(&desc, 1, &drops);
        w.finalize();
        let _ = w.stringify();
    }
}
