//! Runtime type descriptors for the Courier core.
//!
//! Rust has no runtime reflection over subtyping or generic arguments, so the
//! type model the resolver matches against is an explicit descriptor: a
//! registered [`TypeTag`] identifying the type definition, an ordered list of
//! generic type arguments, and a declared supertype list. A [`TypeDescriptor`]
//! provides the three primitives the matcher needs:
//!
//! - [`is_assignable_from`](TypeDescriptor::is_assignable_from) - the is-a /
//!   implements relation
//! - [`is_generic`](TypeDescriptor::is_generic) - whether the type carries
//!   type arguments
//! - [`type_args`](TypeDescriptor::type_args) / [`definition`](TypeDescriptor::definition) -
//!   ordered argument extraction and the unparameterized generic definition
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_core::{TypeDescriptor, TypeTag};
//!
//! let animal = TypeDescriptor::new(TypeTag::new("Animal"));
//! let dog = TypeDescriptor::new(TypeTag::new("Dog")).with_base(animal.clone());
//!
//! assert!(animal.is_assignable_from(&dog));
//! assert!(!dog.is_assignable_from(&animal));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// Type Tags
// ============================================================================

/// Identifies a type *definition* - the nominal type without its generic
/// arguments (e.g. "Envelope-of-X" without committing to X).
///
/// Two tags are equal when their registered names are equal, so every type
/// definition in a program must register under a distinct name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Creates a tag for the given type name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the registered type name.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// Type Descriptors
// ============================================================================

/// A structural description of a runtime type.
///
/// A descriptor is an immutable value built once per type via the fluent
/// builder methods and handed out by [`Reflect`](crate::foundation::message::Reflect)
/// implementations:
///
/// - `tag` identifies the type definition,
/// - `args` holds the ordered generic type arguments (empty for non-generic
///   types),
/// - `bases` lists the declared supertypes (base types and implemented
///   interfaces), each itself a full descriptor.
///
/// # Identity
///
/// Two descriptors describe the same type when their tags and their type
/// arguments are equal, recursively. The supertype list is metadata about the
/// type, not part of its identity, so [`PartialEq`] ignores it.
#[derive(Clone)]
pub struct TypeDescriptor {
    tag: TypeTag,
    args: Vec<TypeDescriptor>,
    bases: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Creates a descriptor for a non-generic type with no declared supertypes.
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            args: Vec::new(),
            bases: Vec::new(),
        }
    }

    /// Appends a generic type argument (builder pattern).
    ///
    /// Argument order is positional and must match the declaration order of
    /// the type's generic parameters.
    pub fn with_arg(mut self, arg: TypeDescriptor) -> Self {
        self.args.push(arg);
        self
    }

    /// Appends several generic type arguments (builder pattern).
    pub fn with_args(mut self, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.args.extend(args);
        self
    }

    /// Appends a declared supertype (builder pattern).
    ///
    /// Supertypes the base itself declares are reachable transitively; only
    /// the direct bases need to be listed.
    pub fn with_base(mut self, base: TypeDescriptor) -> Self {
        self.bases.push(base);
        self
    }

    /// Returns the tag identifying this type's definition.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Returns the registered name of this type's definition.
    pub fn name(&self) -> &'static str {
        self.tag.name()
    }

    /// Returns the ordered generic type arguments.
    pub fn type_args(&self) -> &[TypeDescriptor] {
        &self.args
    }

    /// Returns the declared direct supertypes.
    pub fn bases(&self) -> &[TypeDescriptor] {
        &self.bases
    }

    /// Returns `true` if this type carries generic type arguments.
    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// Returns the unparameterized generic definition of this type.
    ///
    /// Type arguments are erased recursively, including from the supertype
    /// list, so `Envelope<Dog>` and `Envelope<Animal>` share one definition.
    pub fn definition(&self) -> TypeDescriptor {
        TypeDescriptor {
            tag: self.tag,
            args: Vec::new(),
            bases: self.bases.iter().map(TypeDescriptor::definition).collect(),
        }
    }

    /// Tests whether a value of the `runtime` type can be used where this
    /// type is expected.
    ///
    /// Covers identity (same tag and same type arguments), subclassing, and
    /// interface implementation, by walking the runtime descriptor's supertype
    /// list transitively. It does *not* recurse into type arguments - that is
    /// the matcher's job.
    pub fn is_assignable_from(&self, runtime: &TypeDescriptor) -> bool {
        self == runtime || runtime.bases.iter().any(|base| self.is_assignable_from(base))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.args == other.args
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.args.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        if let Some((first, rest)) = self.args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({self})")
    }
}
