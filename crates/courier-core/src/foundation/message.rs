//! Message model for the Courier core.
//!
//! This module provides the message abstraction the resolver operates on:
//!
//! - [`Reflect`] - the static side: a type that can describe itself with a
//!   [`TypeDescriptor`]
//! - [`Message`] - the object-safe runtime side, implemented for every sized
//!   `Reflect` type via a blanket impl
//! - [`BoxedMessage`] - a type-erased, cheaply clonable message carrier
//!
//! # Interface registration
//!
//! `Reflect` deliberately has no `Self: Sized` bound so that trait-object
//! types can implement it too. That lets a handler register against an
//! interface the way it would against a concrete type:
//!
//! ```rust,ignore
//! trait RegisteredEvent {}
//!
//! impl Reflect for dyn RegisteredEvent {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::new(TypeTag::new("RegisteredEvent"))
//!     }
//! }
//!
//! resolver.register::<dyn RegisteredEvent>(|message| { /* ... */ });
//! ```

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::foundation::descriptor::{TypeDescriptor, TypeTag};
use crate::foundation::error::{ExtractError, ExtractResult};

// ============================================================================
// Reflect - static type description
// ============================================================================

/// A type that can describe itself as a [`TypeDescriptor`].
///
/// Implementations build the descriptor from scratch on every call; they
/// should be cheap, pure, and stable - two calls must return equal
/// descriptors. Concrete message types list their supertypes via
/// [`TypeDescriptor::with_base`] and, for generic types, their type arguments
/// via [`TypeDescriptor::with_arg`].
pub trait Reflect: 'static {
    /// Returns the descriptor for this type.
    fn descriptor() -> TypeDescriptor;
}

// ============================================================================
// Message - object-safe runtime side
// ============================================================================

/// The object-safe runtime view of a message.
///
/// Implemented automatically for every sized [`Reflect`] type; do not
/// implement it by hand. `dyn Message` is what handler callbacks receive and
/// what the resolver computes runtime descriptors from.
pub trait Message: Any + Send + Sync {
    /// Returns the descriptor of this message's concrete runtime type.
    fn descriptor(&self) -> TypeDescriptor;

    /// Returns the registered name of this message's concrete runtime type.
    fn type_name(&self) -> &'static str {
        self.descriptor().name()
    }

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Reflect + Send + Sync> Message for T {
    fn descriptor(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Message {
    /// Returns `true` if the concrete runtime type is `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.as_any().is::<M>()
    }

    /// Attempts to downcast to the concrete message type.
    ///
    /// This is an exact-type operation: a message of a subtype does not
    /// downcast to its supertype. Handlers registered against a supertype or
    /// interface work with `&dyn Message` directly.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref()
    }

    /// Downcasts to the concrete message type, reporting the mismatch.
    pub fn extract<M: Message>(&self) -> ExtractResult<&M> {
        self.downcast_ref().ok_or_else(|| ExtractError::TypeMismatch {
            expected: std::any::type_name::<M>(),
            got: self.type_name(),
        })
    }
}

impl fmt::Debug for dyn Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({})", self.descriptor())
    }
}

// ============================================================================
// Boxed Message
// ============================================================================

/// A type-erased container for messages that supports runtime downcasting.
///
/// `BoxedMessage` wraps any [`Message`] in an `Arc`, letting a surrounding
/// dispatcher pass messages around without knowing their concrete type.
/// It derefs to `dyn Message`, so descriptor and downcast methods are
/// available directly:
///
/// ```rust,ignore
/// let message = BoxedMessage::new(PersonRegistered { id: "42".into() });
/// println!("{}", message.descriptor());
/// for entry in resolver.handlers_for(&*message) {
///     entry.execute(&*message);
/// }
/// ```
#[derive(Clone)]
pub struct BoxedMessage {
    inner: Arc<dyn Message>,
}

impl BoxedMessage {
    /// Creates a new `BoxedMessage` from any message type.
    pub fn new<M: Message>(message: M) -> Self {
        Self {
            inner: Arc::new(message),
        }
    }

    /// Returns the inner `Arc<dyn Message>`.
    pub fn inner(&self) -> &Arc<dyn Message> {
        &self.inner
    }
}

impl Deref for BoxedMessage {
    type Target = dyn Message;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for BoxedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedMessage")
            .field("type", &self.descriptor())
            .finish()
    }
}

// ============================================================================
// Reflect implementations for std types
// ============================================================================

// Value and text types are ordinary runtime types to the matcher; they get
// plain non-generic descriptors.
macro_rules! reflect_leaf {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new(TypeTag::new($name))
                }
            }
        )*
    };
}

reflect_leaf! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
    &'static str => "str",
}

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(TypeTag::new("Vec")).with_arg(T::descriptor())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(TypeTag::new("Option")).with_arg(T::descriptor())
    }
}
