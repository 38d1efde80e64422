//! # Courier Core
//!
//! The polymorphic message-handler resolution core of the Courier messaging
//! framework.
//!
//! Given a registry of handlers, each bound to a declared message type
//! (possibly generic, possibly an envelope wrapper around a message), and an
//! incoming message instance, this crate determines the ordered set of
//! handlers that should execute - respecting interface implementation,
//! inheritance, generic-parameter covariance, and envelope unwrapping.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! The type system and message model:
//! - **Type Descriptors**: explicit runtime type information with
//!   assignability, generic-ness, and type-argument extraction
//!   ([`TypeDescriptor`], [`TypeTag`])
//! - **Message Model**: self-describing, type-erasable messages ([`Reflect`],
//!   [`Message`], [`BoxedMessage`])
//! - **Envelope Capability**: two-tier typed/untyped payload access
//!   ([`Envelope`], [`TypedEnvelope`], [`MessageEnvelope`])
//!
//! ### Framework Layer
//!
//! Matching and resolution:
//! - **Matcher**: the recursive structural compatibility relation
//!   ([`matches`])
//! - **Resolver**: insertion-ordered registry and query entry point
//!   ([`HandlerResolver`], [`HandlerEntry`])
//!
//! ## Resolution Flow
//!
//! ```text
//! ┌────────────┐     ┌──────────────────┐     ┌───────────┐
//! │  Message   │────▶│ HandlerResolver  │────▶│  Handler  │
//! │ (any type) │     │ (match + order)  │────▶│  Handler  │
//! └────────────┘     └──────────────────┘────▶│  Handler  │
//!                                             └───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use courier_core::envelope_of;
//! use courier_core::{
//!     HandlerResolver, Message, MessageEnvelope, Reflect, TypeDescriptor, TypeTag,
//! };
//!
//! struct UserRegistered {
//!     name: String,
//! }
//!
//! impl Reflect for UserRegistered {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::new(TypeTag::new("UserRegistered"))
//!     }
//! }
//!
//! let resolver = HandlerResolver::new();
//! resolver
//!     // Fires for the bare message.
//!     .register::<UserRegistered>(|message: &dyn Message| {
//!         let user = message.downcast_ref::<UserRegistered>().unwrap();
//!         println!("registered: {}", user.name);
//!     })
//!     // Fires for any envelope wrapping a UserRegistered.
//!     .register_for(envelope_of(<UserRegistered as Reflect>::descriptor()), |_: &dyn Message| {
//!         println!("enveloped registration");
//!     });
//!
//! let message = MessageEnvelope::new(UserRegistered { name: "ada".into() });
//! resolver.dispatch(&message);
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;

// Re-export foundation types
pub use foundation::{
    BoxedMessage, ENVELOPE_TAG, Envelope, ExtractError, ExtractResult, Message, MessageEnvelope,
    Reflect, TypeDescriptor, TypeTag, TypedEnvelope, envelope, envelope_of,
};

// Re-export framework types
pub use framework::{HandlerCallback, HandlerEntry, HandlerResolver, matches};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{HandlerEntry, HandlerResolver, matches};
}
