//! Per-type behavioral operations
//!
//! Every native type exposed through the bridge carries one operation
//! table: copy, destroy, and render are mandatory, compare and hash are
//! optional capabilities. The table is a trait object rather than a bundle
//! of nullable function pointers, so the mandatory operations cannot be
//! left out and the optional ones report [`OpError::Unsupported`] by
//! default instead of crashing.
//!
//! Two layers are provided:
//!
//! - [`OpsTable`] — the erased layer operating on opaque `*mut ()` handles,
//!   the contract the wrapper and registry dispatch through.
//! - [`NativeType`] + [`TypedOps`] — the safe typed layer. Implement
//!   `NativeType` for a Rust value type and `TypedOps<T>` derives the
//!   erased table, with `Box` drop glue standing in for a hand-written
//!   destroy function.

use std::any::TypeId;
use std::cmp::Ordering;
use std::marker::PhantomData;

// ============================================================================
// Comparison operators
// ============================================================================

/// Ordering operator requested by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
}

impl CompareOp {
    /// Evaluate this operator against a total ordering of the two operands.
    pub fn evaluate(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

// ============================================================================
// Operation outcomes
// ============================================================================

/// Failure modes of the optional operations.
///
/// The two variants are deliberately distinct: `Unsupported` means the type
/// never implements the operation, `Incomparable` means the operation exists
/// but this particular pair of values cannot be ordered for the requested
/// operator. No sentinel value doubles as both an error and a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpError {
    /// The type does not implement this optional operation
    Unsupported,
    /// The values cannot be ordered for the requested operator
    Incomparable,
}

/// Whether a hash may be cached by the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// The value never mutates; its hash may be computed once and cached
    Immutable,
    /// The value may mutate; the hash must be recomputed on every request
    Mutable,
}

/// A computed hash plus its caching contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOutcome {
    /// The hash value
    pub value: u64,
    /// Whether the wrapper may cache `value`
    pub stability: Stability,
}

impl HashOutcome {
    /// Hash of an immutable value (cacheable)
    pub fn immutable(value: u64) -> Self {
        Self {
            value,
            stability: Stability::Immutable,
        }
    }

    /// Hash of a mutable value (recomputed on every request)
    pub fn mutable(value: u64) -> Self {
        Self {
            value,
            stability: Stability::Mutable,
        }
    }
}

// ============================================================================
// Erased operation table
// ============================================================================

/// The per-type operation table, erased to opaque handles.
///
/// One implementation exists per native type and is shared by every wrapper
/// of that type through its descriptor. Implementations must be
/// non-blocking, reentrant, and free of hidden global mutation — the host
/// runtime may dispatch from arbitrary call contexts, including its own
/// collection cycles, and an operation that re-enters the registry can
/// deadlock it.
///
/// # Safety
///
/// Every method taking a handle requires that the handle was produced for
/// this same table (points to a live value of the table's native type).
/// The wrapper layer maintains that invariant; hand-written callers must
/// uphold it themselves.
pub trait OpsTable: Send + Sync {
    /// Produce an independently owned deep copy of `value`.
    ///
    /// Mutating the source afterwards must never affect the copy. The
    /// returned handle is owned by the caller and must eventually be
    /// released through [`OpsTable::destroy`].
    ///
    /// # Safety
    /// `value` must point to a live value of this table's native type.
    unsafe fn copy(&self, value: *const ()) -> *mut ();

    /// Release all resources owned by one native value.
    ///
    /// Must be called exactly once per owned handle; calling it twice on
    /// the same handle is undefined behavior. The wrapper state machine
    /// guarantees the at-most-once discipline for wrapped handles.
    ///
    /// # Safety
    /// `value` must be an owned handle produced for this table that has
    /// not already been destroyed.
    unsafe fn destroy(&self, value: *mut ());

    /// Produce a human-readable representation of `value`.
    ///
    /// # Safety
    /// `value` must point to a live value of this table's native type.
    unsafe fn render(&self, value: *const ()) -> String;

    /// Evaluate an ordering operator over two values of this type.
    ///
    /// Optional; the default reports [`OpError::Unsupported`]. An
    /// implementation returns `Ok(bool)` for the requested operator or
    /// [`OpError::Incomparable`] when the pair cannot be ordered.
    ///
    /// # Safety
    /// Both handles must point to live values of this table's native type.
    unsafe fn compare(
        &self,
        _a: *const (),
        _b: *const (),
        _op: CompareOp,
    ) -> Result<bool, OpError> {
        Err(OpError::Unsupported)
    }

    /// Hash one value of this type.
    ///
    /// Optional; the default reports [`OpError::Unsupported`]. The
    /// [`Stability`] flag in the outcome tells the wrapper whether the
    /// result may be cached.
    ///
    /// # Safety
    /// `value` must point to a live value of this table's native type.
    unsafe fn hash(&self, _value: *const ()) -> Result<HashOutcome, OpError> {
        Err(OpError::Unsupported)
    }

    /// Identity of the native Rust type behind this table, when known.
    ///
    /// Tables built through [`TypedOps`] report the concrete `TypeId`,
    /// which enables safe downcasts on the wrapper. Hand-written erased
    /// tables return `None` and forgo downcasting.
    fn native_type_id(&self) -> Option<TypeId> {
        None
    }
}

// ============================================================================
// Typed layer
// ============================================================================

/// Safe per-type behavior for a Rust value type.
///
/// Implement this and register through
/// [`TypeRegistry::register_native`](crate::TypeRegistry::register_native);
/// the erased [`OpsTable`] is derived by [`TypedOps`]. `compare` and
/// `hash_value` are optional capabilities — leave the defaults in place for
/// a type that is neither orderable nor hashable.
pub trait NativeType: Sized + Send + 'static {
    /// Independently owned deep copy.
    fn deep_copy(&self) -> Self;

    /// Human-readable representation.
    fn render(&self) -> String;

    /// Evaluate an ordering operator against another value of this type.
    fn compare(&self, _other: &Self, _op: CompareOp) -> Result<bool, OpError> {
        Err(OpError::Unsupported)
    }

    /// Hash this value, reporting whether the hash may be cached.
    fn hash_value(&self) -> Result<HashOutcome, OpError> {
        Err(OpError::Unsupported)
    }
}

/// Erased [`OpsTable`] derived from a [`NativeType`] implementation.
///
/// Handles are `Box<T>` allocations: `copy` boxes a `deep_copy`, `destroy`
/// rebuilds the box and lets drop glue run. Ownership mistakes that would
/// be double frees in a hand-written table become impossible here.
pub struct TypedOps<T: NativeType>(PhantomData<fn() -> T>);

impl<T: NativeType> TypedOps<T> {
    /// Create the table for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }

    /// Move `value` onto the heap and return its erased owned handle.
    pub fn into_handle(value: T) -> *mut () {
        Box::into_raw(Box::new(value)) as *mut ()
    }
}

impl<T: NativeType> Default for TypedOps<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeType> OpsTable for TypedOps<T> {
    unsafe fn copy(&self, value: *const ()) -> *mut () {
        let value = &*(value as *const T);
        Box::into_raw(Box::new(value.deep_copy())) as *mut ()
    }

    unsafe fn destroy(&self, value: *mut ()) {
        drop(Box::from_raw(value as *mut T));
    }

    unsafe fn render(&self, value: *const ()) -> String {
        (*(value as *const T)).render()
    }

    unsafe fn compare(&self, a: *const (), b: *const (), op: CompareOp) -> Result<bool, OpError> {
        let a = &*(a as *const T);
        let b = &*(b as *const T);
        a.compare(b, op)
    }

    unsafe fn hash(&self, value: *const ()) -> Result<HashOutcome, OpError> {
        (*(value as *const T)).hash_value()
    }

    fn native_type_id(&self) -> Option<TypeId> {
        Some(TypeId::of::<T>())
    }
}

// ============================================================================
// Tests
// ============================================================================
