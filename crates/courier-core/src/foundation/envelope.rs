//! Envelope abstraction for the Courier core.
//!
//! An envelope is a wrapper around a message that carries both a
//! statically-typed payload and a type-erased view of the same payload. The
//! capability is two-tiered so handlers can register at either level:
//!
//! - [`Envelope`] - the untyped capability, exposing only the erased payload.
//!   A handler registered for the [`envelope`] descriptor fires for *every*
//!   envelope instance regardless of payload type.
//! - [`TypedEnvelope`] - extends `Envelope` with access to the typed payload.
//!
//! [`MessageEnvelope<T>`] is the concrete carrier implementing both. Its
//! descriptor declares the generic envelope interface (and, transitively, the
//! untyped one) as supertypes, so the matcher can unwrap envelopes
//! structurally: a handler for "envelope of `Animal`" fires for
//! `MessageEnvelope<Dog>`.

use crate::foundation::descriptor::{TypeDescriptor, TypeTag};
use crate::foundation::message::{Message, Reflect};

/// Tag of the envelope interface. The untyped and the generic capability
/// share the definition; they differ only in their type arguments.
pub const ENVELOPE_TAG: TypeTag = TypeTag::new("Envelope");

const MESSAGE_ENVELOPE_TAG: TypeTag = TypeTag::new("MessageEnvelope");

// ============================================================================
// Capabilities
// ============================================================================

/// The untyped envelope capability.
pub trait Envelope: Message {
    /// Returns the payload with its compile-time type erased.
    fn untyped_payload(&self) -> &dyn Message;
}

/// The typed envelope capability.
///
/// `untyped_payload` and [`payload`](TypedEnvelope::payload) always refer to
/// the same value; the untyped accessor merely erases the type.
pub trait TypedEnvelope: Envelope {
    /// The payload type handlers match against.
    type Payload: Message;

    /// Returns the typed payload.
    fn payload(&self) -> &Self::Payload;
}

// ============================================================================
// Well-known descriptors
// ============================================================================

/// Descriptor of the untyped envelope interface.
///
/// Registering a handler for this descriptor selects it for every envelope
/// instance, whatever the payload.
pub fn envelope() -> TypeDescriptor {
    TypeDescriptor::new(ENVELOPE_TAG)
}

/// Descriptor of the generic envelope interface over the given payload type.
///
/// This is the descriptor to register against when the payload position names
/// an interface, e.g. "envelope of `Animal`":
///
/// ```rust,ignore
/// resolver.register_for(envelope_of(animal_descriptor()), |message| { /* ... */ });
/// ```
pub fn envelope_of(payload: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::new(ENVELOPE_TAG)
        .with_arg(payload)
        .with_base(envelope())
}

// ============================================================================
// Concrete carrier
// ============================================================================

/// The concrete envelope carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope<T> {
    payload: T,
}

impl<T: Reflect + Send + Sync> MessageEnvelope<T> {
    /// Wraps a payload in an envelope.
    pub fn new(payload: T) -> Self {
        Self { payload }
    }

    /// Unwraps the envelope, returning the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T: Reflect + Send + Sync> Reflect for MessageEnvelope<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(MESSAGE_ENVELOPE_TAG)
            .with_arg(T::descriptor())
            .with_base(envelope_of(T::descriptor()))
    }
}

impl<T: Reflect + Send + Sync> Envelope for MessageEnvelope<T> {
    fn untyped_payload(&self) -> &dyn Message {
        &self.payload
    }
}

impl<T: Reflect + Send + Sync> TypedEnvelope for MessageEnvelope<T> {
    type Payload = T;

    fn payload(&self) -> &T {
        &self.payload
    }
}
