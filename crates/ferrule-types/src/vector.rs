//! Vec3 — a value type with only the mandatory operations
//!
//! Three floats, copyable and renderable, deliberately without compare or
//! hash capabilities: host-side code that tries to order or hash one gets
//! an unsupported report, never a default "equal" or an identity hash.

use std::sync::Arc;

use ferrule_bridge::{
    ConstructorDef, MethodDef, NativeType, TypeDescriptor, TypeRegistry, TypedOps,
};

/// Registered name of [`Vec3`].
pub const VEC3_TYPE_NAME: &str = "Vec3";

/// A three-component vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Construct from components
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            *self
        } else {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        }
    }
}

impl NativeType for Vec3 {
    fn deep_copy(&self) -> Self {
        *self
    }

    fn render(&self) -> String {
        format!("({}, {}, {})", self.x, self.y, self.z)
    }

    // No compare, no hash: the defaults report unsupported.
}

// ============================================================================
// Exposed method and constructor tables
// ============================================================================

/// `vec.normalized()` — a new unit-length vector.
unsafe fn vec3_normalized(recv: *mut (), _args: *const *mut (), _nargs: usize) -> *mut () {
    let vec = &*(recv as *const Vec3);
    TypedOps::into_handle(vec.normalized())
}

/// `Vec3()` — the origin.
unsafe fn vec3_origin(_args: *const *mut (), _nargs: usize) -> *mut () {
    TypedOps::into_handle(Vec3::new(0.0, 0.0, 0.0))
}

/// Register [`Vec3`] with its method and constructor tables.
pub fn register_vec3(registry: &TypeRegistry) -> Arc<TypeDescriptor> {
    registry.register(
        TypeDescriptor::builder(VEC3_TYPE_NAME, Arc::new(TypedOps::<Vec3>::new()))
            .docs("A three-component vector. Not orderable, not hashable.")
            .method(MethodDef {
                name: "normalized",
                doc: "A new unit-length vector in the same direction.",
                func: vec3_normalized,
            })
            .constructor(ConstructorDef {
                name: "Vec3",
                doc: "Create the origin vector.",
                func: vec3_origin,
            })
            .build(),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_bridge::{BridgeError, CompareOp};

    #[test]
    fn test_compare_without_capability_reports_unsupported() {
        let registry = TypeRegistry::new();
        register_vec3(&registry);

        let v = Vec3::new(1.0, 2.0, 3.0);
        let w = unsafe { registry.wrap_existing(VEC3_TYPE_NAME, TypedOps::into_handle(v)) }
            .unwrap();

        // Even self-comparison must not default to "equal".
        match w.compare_with(&w, CompareOp::Eq) {
            Err(BridgeError::UnsupportedOperation {
                type_name,
                operation,
            }) => {
                assert_eq!(type_name, VEC3_TYPE_NAME);
                assert_eq!(operation, "compare");
            }
            other => panic!("expected UnsupportedOperation, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_without_capability_reports_unsupported() {
        let registry = TypeRegistry::new();
        register_vec3(&registry);

        let w = registry
            .wrap_value(VEC3_TYPE_NAME, Vec3::new(0.0, 1.0, 0.0))
            .unwrap();
        match w.hash_value() {
            Err(BridgeError::UnsupportedOperation { operation, .. }) => {
                assert_eq!(operation, "hash")
            }
            other => panic!("expected UnsupportedOperation, got {other:?}"),
        }
    }

    #[test]
    fn test_render_and_copy() {
        let registry = TypeRegistry::new();
        register_vec3(&registry);

        let source = Vec3::new(3.0, 0.0, 4.0);
        let w = unsafe {
            registry.wrap_copy(VEC3_TYPE_NAME, &source as *const Vec3 as *const ())
        }
        .unwrap();
        assert_eq!(w.stringify(), "(3, 0, 4)");
        assert_eq!(w.downcast_ref::<Vec3>().unwrap().length(), 5.0);
    }

    #[test]
    fn test_normalized_method_entry() {
        let registry = TypeRegistry::new();
        let desc = register_vec3(&registry);

        let mut w = registry
            .wrap_value(VEC3_TYPE_NAME, Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        let recv = w.downcast_mut::<Vec3>().unwrap() as *mut Vec3 as *mut ();
        let out = unsafe { (desc.method("normalized").unwrap().func)(recv, std::ptr::null(), 0) };
        let out = unsafe { registry.wrap_existing(VEC3_TYPE_NAME, out) }.unwrap();
        assert_eq!(out.downcast_ref::<Vec3>(), Some(&Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_constructor_entry_builds_origin() {
        let registry = TypeRegistry::new();
        let desc = register_vec3(&registry);

        let handle = unsafe { (desc.constructor("Vec3").unwrap().func)(std::ptr::null(), 0) };
        let w = unsafe { registry.wrap_existing(VEC3_TYPE_NAME, handle) }.unwrap();
        assert_eq!(w.downcast_ref::<Vec3>(), Some(&Vec3::new(0.0, 0.0, 0.0)));
    }
}
