//! Foundation layer - type system and message model.
//!
//! This module contains the abstractions the resolver is built on:
//! - Type descriptors: explicit runtime type information ([`TypeDescriptor`])
//! - Message model: self-describing, type-erasable messages ([`Message`])
//! - Envelope capability: typed and untyped payload access ([`Envelope`])

pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod message;

pub use descriptor::{TypeDescriptor, TypeTag};
pub use envelope::{ENVELOPE_TAG, Envelope, MessageEnvelope, TypedEnvelope, envelope, envelope_of};
pub use error::{ExtractError, ExtractResult};
pub use message::{BoxedMessage, Message, Reflect};
