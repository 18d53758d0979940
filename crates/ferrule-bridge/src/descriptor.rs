//! Type descriptors — static per-type metadata
//!
//! One descriptor exists per registered native type: the unique name, its
//! documentation, the method and constructor tables exposed to the host
//! runtime, and the operation table every wrapper of the type dispatches
//! through. Descriptors are immutable once registered and shared by `Arc`.

use std::fmt;
use std::sync::Arc;

use crate::ops::OpsTable;

// ============================================================================
// Boundary signatures
// ============================================================================

/// Erased signature for a method exposed on a wrapped type.
///
/// Argument marshalling is the host runtime's concern; the bridge only
/// stores and hands back these entries.
///
/// # Safety
/// `recv` must be a live handle of the method's type; `args` must point to
/// `nargs` live handles.
pub type MethodFn = unsafe fn(recv: *mut (), args: *const *mut (), nargs: usize) -> *mut ();

/// Erased signature for an exposed constructor. Returns an owned handle.
///
/// # Safety
/// `args` must point to `nargs` live handles.
pub type ConstructorFn = unsafe fn(args: *const *mut (), nargs: usize) -> *mut ();

/// One entry in a descriptor's exposed-method table.
#[derive(Clone, Copy)]
pub struct MethodDef {
    /// Method name as seen by the host runtime
    pub name: &'static str,
    /// Documentation line
    pub doc: &'static str,
    /// Erased implementation
    pub func: MethodFn,
}

/// One entry in a descriptor's exposed-constructor table.
#[derive(Clone, Copy)]
pub struct ConstructorDef {
    /// Constructor name as seen by the host runtime
    pub name: &'static str,
    /// Documentation line
    pub doc: &'static str,
    /// Erased implementation
    pub func: ConstructorFn,
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef").field("name", &self.name).finish()
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Static metadata for one native value type.
///
/// The three mandatory operations (copy, destroy, render) are always
/// present — the [`OpsTable`] trait cannot be implemented without them.
/// A descriptor whose table lacks the optional compare/hash capabilities
/// reports unsupported when those protocols are invoked, never crashes.
pub struct TypeDescriptor {
    name: String,
    docs: String,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
    ops: Arc<dyn OpsTable>,
}

impl TypeDescriptor {
    /// Start building a descriptor. The operation table is mandatory and
    /// supplied up front; docs, methods, and constructors are optional.
    pub fn builder(name: impl Into<String>, ops: Arc<dyn OpsTable>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: name.into(),
            docs: String::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            ops,
        }
    }

    /// Registered type name (unique registry key)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation text
    pub fn docs(&self) -> &str {
        &self.docs
    }

    /// The operation table
    pub fn ops(&self) -> &Arc<dyn OpsTable> {
        &self.ops
    }

    /// Look up an exposed method by name
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Look up an exposed constructor by name
    pub fn constructor(&self, name: &str) -> Option<&ConstructorDef> {
        self.constructors.iter().find(|c| c.name == name)
    }

    /// Exposed-method table, in declaration order
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// Exposed-constructor table, in declaration order
    pub fn constructors(&self) -> &[ConstructorDef] {
        &self.constructors
    }

    /// Whether two descriptors share one operation table
    pub fn same_ops(&self, other: &TypeDescriptor) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    name: String,
    docs: String,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
    ops: Arc<dyn OpsTable>,
}

impl TypeDescriptorBuilder {
    /// Set the documentation text
    pub fn docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = docs.into();
        self
    }

    /// Append an exposed method
    pub fn method(mut self, def: MethodDef) -> Self {
        self.methods.push(def);
        self
    }

    /// Append an exposed constructor
    pub fn constructor(mut self, def: ConstructorDef) -> Self {
        self.constructors.push(def);
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            docs: self.docs,
            methods: self.methods,
            constructors: self.constructors,
            ops: self.ops,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
