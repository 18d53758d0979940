//! Variant — a tagged scalar with full compare/hash capabilities
//!
//! The workhorse value type of the bridge: an immutable tagged scalar
//! ordered by a strict weak order (type tag first, then value) and hashed
//! consistently with that order. Two variants of different tags are never
//! equal; an ordering between them is still defined, by tag precedence,
//! so sorted host-side collections behave deterministically.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ferrule_bridge::{
    CompareOp, ConstructorDef, HashOutcome, MethodDef, NativeType, OpError, TypeDescriptor,
    TypeRegistry, TypedOps,
};
use rustc_hash::FxHasher;

/// Registered name of [`Variant`].
pub const VARIANT_TYPE_NAME: &str = "Variant";

/// A value-semantic tagged scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// No value (the invalid variant)
    Empty,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Real(f64),
    /// Owned text
    Text(String),
}

impl Variant {
    /// Tag precedence for the strict weak order.
    fn type_order(&self) -> u8 {
        match self {
            Variant::Empty => 0,
            Variant::Bool(_) => 1,
            Variant::Int(_) => 2,
            Variant::Real(_) => 3,
            Variant::Text(_) => 4,
        }
    }

    /// Whether this variant holds a value
    pub fn is_valid(&self) -> bool {
        !matches!(self, Variant::Empty)
    }

    /// Strict weak order: tag first, then value.
    ///
    /// The only unordered pair is two reals where at least one is NaN.
    pub fn strict_order(&self, other: &Variant) -> Result<Ordering, OpError> {
        let tag_cmp = self.type_order().cmp(&other.type_order());
        if tag_cmp != Ordering::Equal {
            return Ok(tag_cmp);
        }
        match (self, other) {
            (Variant::Empty, Variant::Empty) => Ok(Ordering::Equal),
            (Variant::Bool(a), Variant::Bool(b)) => Ok(a.cmp(b)),
            (Variant::Int(a), Variant::Int(b)) => Ok(a.cmp(b)),
            (Variant::Real(a), Variant::Real(b)) => {
                a.partial_cmp(b).ok_or(OpError::Incomparable)
            }
            (Variant::Text(a), Variant::Text(b)) => Ok(a.cmp(b)),
            // Tags matched above, so the pairs cannot be mixed.
            _ => unreachable!("tag precedence already compared"),
        }
    }
}

impl NativeType for Variant {
    fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn render(&self) -> String {
        match self {
            Variant::Empty => "(empty)".to_string(),
            Variant::Bool(b) => b.to_string(),
            Variant::Int(i) => i.to_string(),
            Variant::Real(r) => r.to_string(),
            Variant::Text(t) => t.clone(),
        }
    }

    fn compare(&self, other: &Self, op: CompareOp) -> Result<bool, OpError> {
        Ok(op.evaluate(self.strict_order(other)?))
    }

    fn hash_value(&self) -> Result<HashOutcome, OpError> {
        let mut hasher = FxHasher::default();
        self.type_order().hash(&mut hasher);
        match self {
            Variant::Empty => {}
            Variant::Bool(b) => b.hash(&mut hasher),
            Variant::Int(i) => i.hash(&mut hasher),
            Variant::Real(r) => {
                // +0.0 and -0.0 compare equal; give them one hash.
                let bits = if *r == 0.0 { 0f64.to_bits() } else { r.to_bits() };
                bits.hash(&mut hasher);
            }
            Variant::Text(t) => t.hash(&mut hasher),
        }
        Ok(HashOutcome::immutable(hasher.finish()))
    }
}

// ============================================================================
// Exposed method and constructor tables
// ============================================================================

/// `variant.to_text()` — render into a new `Text` variant.
unsafe fn variant_to_text(recv: *mut (), _args: *const *mut (), _nargs: usize) -> *mut () {
    let variant = &*(recv as *const Variant);
    TypedOps::into_handle(Variant::Text(variant.render()))
}

/// `variant.is_valid()` — whether the variant holds a value.
unsafe fn variant_is_valid(recv: *mut (), _args: *const *mut (), _nargs: usize) -> *mut () {
    let variant = &*(recv as *const Variant);
    TypedOps::into_handle(Variant::Bool(variant.is_valid()))
}

/// `Variant()` — the empty variant.
unsafe fn variant_empty(_args: *const *mut (), _nargs: usize) -> *mut () {
    TypedOps::into_handle(Variant::Empty)
}

/// Register [`Variant`] with its method and constructor tables.
pub fn register_variant(registry: &TypeRegistry) -> Arc<TypeDescriptor> {
    registry.register(
        TypeDescriptor::builder(VARIANT_TYPE_NAME, Arc::new(TypedOps::<Variant>::new()))
            .docs("A tagged scalar: empty, bool, int, real, or text.")
            .method(MethodDef {
                name: "to_text",
                doc: "Render this variant into a text variant.",
                func: variant_to_text,
            })
            .method(MethodDef {
                name: "is_valid",
                doc: "Whether this variant holds a value.",
                func: variant_is_valid,
            })
            .constructor(ConstructorDef {
                name: "Variant",
                doc: "Create an empty variant.",
                func: variant_empty,
            })
            .build(),
    )
}

// ============================================================================
// Tests
// ============================================================================
