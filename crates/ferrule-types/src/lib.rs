//! Built-in value types exposed through the ferrule bridge
//!
//! Two reference implementations of the [`NativeType`] contract:
//!
//! - [`Variant`] — a tagged scalar with the full protocol surface
//!   (strict-weak-order compare, stable hash, method/constructor tables).
//! - [`Vec3`] — only the mandatory operations; ordering or hashing one
//!   reports unsupported.
//!
//! [`NativeType`]: ferrule_bridge::NativeType

#![warn(missing_docs)]

mod variant;
mod vector;

pub use variant::{register_variant, Variant, VARIANT_TYPE_NAME};
pub use vector::{register_vec3, Vec3, VEC3_TYPE_NAME};

use ferrule_bridge::TypeRegistry;

/// Register every built-in type with `registry`.
///
/// Idempotent: re-running against a registry that already holds the
/// built-ins leaves the first descriptors in effect.
pub fn register_builtin_types(registry: &TypeRegistry) {
    register_variant(registry);
    register_vec3(registry);
}
