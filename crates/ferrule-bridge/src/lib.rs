//! Ferrule bridge — exposing value-semantic native types to a dynamic host
//!
//! This crate is the boundary layer between a statically typed native
//! layer and a dynamically typed host runtime, for types that are *not*
//! part of a shared polymorphic, reference-counted hierarchy. Each exposed
//! type contributes one operation table (copy, destroy, render mandatory;
//! compare and hash optional), one descriptor in the [`TypeRegistry`], and
//! any number of lightweight [`Wrapper`] handles the host runtime holds.
//!
//! # Example
//!
//! ```ignore
//! use ferrule_bridge::{CompareOp, NativeType, TypeRegistry};
//!
//! struct Celsius(f64);
//!
//! impl NativeType for Celsius {
//!     fn deep_copy(&self) -> Self { Celsius(self.0) }
//!     fn render(&self) -> String { format!("{}°C", self.0) }
//! }
//!
//! let registry = TypeRegistry::new();
//! registry.register_native::<Celsius>("Celsius", "A temperature.");
//!
//! let wrapper = registry.wrap_value("Celsius", Celsius(21.5))?;
//! assert_eq!(wrapper.stringify(), "21.5°C");
//! // Celsius has no compare capability: reported, never defaulted.
//! assert!(wrapper.compare_with(&wrapper, CompareOp::Eq).is_err());
//! ```
//!
//! # Ownership
//!
//! A wrapper is either *owning* (destroys its handle exactly once, on
//! finalization) or *borrowing* (never destroys). The distinction is a
//! tagged state chosen at the entry point — `wrap_existing`/`wrap_copy`/
//! `wrap_value` produce owning wrappers, `wrap_borrowed` is the explicit
//! opt-out — so double-free responsibility is never ambiguous.

#![warn(missing_docs)]

mod descriptor;
mod error;
mod ops;
mod registry;
mod wrapper;

pub use descriptor::{
    ConstructorDef, ConstructorFn, MethodDef, MethodFn, TypeDescriptor, TypeDescriptorBuilder,
};
pub use error::{BridgeError, BridgeResult};
pub use ops::{CompareOp, HashOutcome, NativeType, OpError, OpsTable, Stability, TypedOps};
pub use registry::TypeRegistry;
pub use wrapper::{is_wrapper_instance, Wrapper};
