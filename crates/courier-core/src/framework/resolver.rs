//! Handler registry and resolution.
//!
//! This module provides the [`HandlerResolver`], which owns an ordered
//! collection of [`HandlerEntry`]s and, for an incoming message, yields every
//! entry whose declared type is compatible with the message's runtime type.
//!
//! # Registration order
//!
//! Registration order is the only ordering signal. Resolution preserves it
//! exactly, regardless of whether an earlier entry's declared type is
//! narrower or broader than a later one's. There is no deduplication and no
//! deregistration.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_core::{HandlerResolver, MessageEnvelope};
//!
//! let resolver = HandlerResolver::new();
//! resolver
//!     .register::<dyn RegisteredEvent>(|message| log_event(message))
//!     .register::<MessageEnvelope<PersonRegistered>>(|message| index_person(message));
//!
//! let message = MessageEnvelope::new(PersonRegistered { id: "42".into() });
//! for entry in resolver.handlers_for(&message) {
//!     entry.execute(&message);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{Level, debug, span, trace};

use crate::foundation::descriptor::TypeDescriptor;
use crate::foundation::message::{Message, Reflect};
use crate::framework::matcher::matches;

/// A type-erased handler callback.
pub type HandlerCallback = Arc<dyn Fn(&dyn Message) + Send + Sync>;

// ============================================================================
// Handler Entry
// ============================================================================

/// Binds one declared type to one callback.
///
/// Immutable after construction: the declared type never changes and the
/// entry owns its callback exclusively.
pub struct HandlerEntry {
    declared: TypeDescriptor,
    callback: HandlerCallback,
}

impl HandlerEntry {
    /// Creates an entry for the given declared type and callback.
    pub fn new(declared: TypeDescriptor, callback: HandlerCallback) -> Self {
        Self { declared, callback }
    }

    /// Returns the type this entry was registered against.
    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared
    }

    /// Tests whether this entry should execute for a message of the given
    /// runtime type.
    pub fn should_execute_for(&self, runtime: &TypeDescriptor) -> bool {
        matches(runtime, &self.declared)
    }

    /// Invokes the callback with the message.
    ///
    /// The entry makes no retry or recovery decision; a panicking callback
    /// propagates to the caller.
    pub fn execute(&self, message: &dyn Message) {
        (self.callback)(message);
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("declared", &self.declared)
            .finish()
    }
}

// ============================================================================
// Handler Resolver
// ============================================================================

/// An insertion-ordered registry of handler entries.
///
/// # Thread Safety
///
/// The backing store sits behind a [`parking_lot::RwLock`], so registration
/// may race with resolution. Resolution holds the read lock only while
/// scanning; the returned snapshot can be iterated (and re-iterated) without
/// touching the registry again.
#[derive(Default)]
pub struct HandlerResolver {
    entries: RwLock<Vec<Arc<HandlerEntry>>>,
}

impl HandlerResolver {
    /// Creates a new, empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for the type `T` (builder pattern).
    ///
    /// `T` may be a concrete message type or a trait-object type implementing
    /// [`Reflect`], which is how handlers register against an interface. The
    /// callback receives the message type-erased; use
    /// [`downcast_ref`](crate::foundation::message::Message) to recover a
    /// concrete type when the registration is exact.
    pub fn register<T>(&self, callback: impl Fn(&dyn Message) + Send + Sync + 'static) -> &Self
    where
        T: Reflect + ?Sized,
    {
        self.register_for(T::descriptor(), callback)
    }

    /// Registers a handler for an explicit type descriptor (builder pattern).
    ///
    /// Needed when the declared type has no Rust type to name, such as
    /// "envelope of `Animal`" built with
    /// [`envelope_of`](crate::foundation::envelope::envelope_of).
    pub fn register_for(
        &self,
        declared: TypeDescriptor,
        callback: impl Fn(&dyn Message) + Send + Sync + 'static,
    ) -> &Self {
        debug!(declared = %declared, "registering handler");
        self.entries
            .write()
            .push(Arc::new(HandlerEntry::new(declared, Arc::new(callback))));
        self
    }

    /// Returns, in registration order, every entry compatible with the
    /// message's runtime type.
    ///
    /// The result is a point-in-time snapshot: matching is a pure function of
    /// the types involved, so resolving the same message twice against an
    /// unchanged registry yields the same entries in the same order. Zero
    /// matches is a normal outcome, not an error.
    pub fn handlers_for(&self, message: &dyn Message) -> Vec<Arc<HandlerEntry>> {
        let runtime = message.descriptor();
        let span = span!(Level::DEBUG, "resolve", message_type = %runtime);
        let _enter = span.enter();

        let entries = self.entries.read();
        let selected: Vec<_> = entries
            .iter()
            .filter(|entry| {
                let matched = entry.should_execute_for(&runtime);
                trace!(declared = %entry.declared_type(), matched, "checked entry");
                matched
            })
            .cloned()
            .collect();

        debug!(
            selected = selected.len(),
            registered = entries.len(),
            "resolution complete"
        );
        selected
    }

    /// Resolves the message and invokes each selected entry's callback with
    /// it, in registration order.
    ///
    /// Selection completes before any execution begins, so a panicking
    /// callback (which propagates) has no effect on which handlers were
    /// selected. Returns the number of handlers invoked.
    pub fn dispatch(&self, message: &dyn Message) -> usize {
        let handlers = self.handlers_for(message);
        for entry in &handlers {
            entry.execute(message);
        }
        handlers.len()
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for HandlerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerResolver")
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::foundation::descriptor::{TypeDescriptor, TypeTag};
    use crate::foundation::envelope::{MessageEnvelope, envelope, envelope_of};
    use crate::foundation::message::Reflect;

    // ------------------------------------------------------------------
    // Fixtures: a small event hierarchy mirroring a registration domain.
    // ------------------------------------------------------------------

    trait RegisteredEvent: Send + Sync {}

    impl Reflect for dyn RegisteredEvent {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new(TypeTag::new("RegisteredEvent"))
        }
    }

    fn cancelled_event() -> TypeDescriptor {
        TypeDescriptor::new(TypeTag::new("CancelledEvent"))
    }

    struct PersonRegistered {
        id: String,
    }

    impl PersonRegistered {
        fn new(id: &str) -> Self {
            Self { id: id.into() }
        }
    }

    impl RegisteredEvent for PersonRegistered {}

    impl Reflect for PersonRegistered {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new(TypeTag::new("PersonRegistered"))
                .with_base(<dyn RegisteredEvent as Reflect>::descriptor())
        }
    }

    // Subtype of PersonRegistered.
    struct CriminalRegistered {
        #[allow(dead_code)]
        id: String,
    }

    impl CriminalRegistered {
        fn new(id: &str) -> Self {
            Self { id: id.into() }
        }
    }

    impl RegisteredEvent for CriminalRegistered {}

    impl Reflect for CriminalRegistered {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new(TypeTag::new("CriminalRegistered"))
                .with_base(<PersonRegistered as Reflect>::descriptor())
        }
    }

    fn flag() -> (Arc<AtomicBool>, impl Fn(&dyn Message) + Send + Sync + 'static) {
        let handled = Arc::new(AtomicBool::new(false));
        let probe = Arc::clone(&handled);
        (handled, move |_: &dyn Message| {
            probe.store(true, Ordering::SeqCst);
        })
    }

    fn recorder(log: Arc<Mutex<Vec<u8>>>, id: u8) -> impl Fn(&dyn Message) + Send + Sync + 'static {
        move |_: &dyn Message| log.lock().push(id)
    }

    #[test]
    fn handles_exact_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<PersonRegistered>(probe);

        resolver.dispatch(&PersonRegistered::new("foo"));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interface_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<dyn RegisteredEvent>(probe);

        resolver.dispatch(&PersonRegistered::new("foo"));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_exact_envelope_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<MessageEnvelope<PersonRegistered>>(probe);

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_envelope_interface_on_exact_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register_for(envelope_of(<PersonRegistered as Reflect>::descriptor()), probe);

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_envelope_interface_on_interface_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register_for(
            envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
            probe,
        );

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn skips_envelope_interface_on_different_message_type() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register_for(envelope_of(cancelled_event()), probe);

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(!handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handlers_do_not_interfere() {
        let resolver = HandlerResolver::new();
        let (handled_cancelled, probe_cancelled) = flag();
        let (handled_registered, probe_registered) = flag();
        resolver
            .register_for(envelope_of(cancelled_event()), probe_cancelled)
            .register_for(
                envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
                probe_registered,
            );

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(!handled_cancelled.load(Ordering::SeqCst));
        assert!(handled_registered.load(Ordering::SeqCst));
    }

    #[test]
    fn all_matching_handlers_selected() {
        let resolver = HandlerResolver::new();
        let (handled_interface, probe_interface) = flag();
        let (handled_concrete, probe_concrete) = flag();
        resolver
            .register_for(
                envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
                probe_interface,
            )
            .register::<MessageEnvelope<PersonRegistered>>(probe_concrete);

        resolver.dispatch(&MessageEnvelope::new(PersonRegistered::new("foo")));

        assert!(handled_interface.load(Ordering::SeqCst));
        assert!(handled_concrete.load(Ordering::SeqCst));
    }

    #[test]
    fn envelopes_of_derived_messages_are_handled() {
        let resolver = HandlerResolver::new();
        let (handled_interface, probe_interface) = flag();
        let (handled_base, probe_base) = flag();
        resolver
            .register_for(
                envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
                probe_interface,
            )
            .register_for(envelope_of(<PersonRegistered as Reflect>::descriptor()), probe_base);

        resolver.dispatch(&MessageEnvelope::new(CriminalRegistered::new("foo")));

        assert!(handled_interface.load(Ordering::SeqCst));
        assert!(handled_base.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_value_types() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<i32>(probe);

        resolver.dispatch(&42i32);

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_strings() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<String>(probe);

        resolver.dispatch(&String::from("42"));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_envelopes_of_value_types() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register_for(envelope_of(<i32 as Reflect>::descriptor()), probe);

        resolver.dispatch(&MessageEnvelope::new(42i32));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_envelopes_of_strings() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<MessageEnvelope<String>>(probe);

        resolver.dispatch(&MessageEnvelope::new(String::from("42")));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_sequences_of_strings() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<MessageEnvelope<Vec<String>>>(probe);

        resolver.dispatch(&MessageEnvelope::new(vec![String::from("42")]));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn works_with_covariant_sequences() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        // "Envelope of sequence of RegisteredEvent".
        let declared = envelope_of(
            TypeDescriptor::new(TypeTag::new("Vec"))
                .with_arg(<dyn RegisteredEvent as Reflect>::descriptor()),
        );
        resolver.register_for(declared, probe);

        resolver.dispatch(&MessageEnvelope::new(vec![PersonRegistered::new("42")]));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_untyped_envelope_interface() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register_for(envelope(), probe);

        resolver.dispatch(&MessageEnvelope::new(CriminalRegistered::new("foo")));

        assert!(handled.load(Ordering::SeqCst));
    }

    #[test]
    fn maintains_order_with_concrete_type_first() {
        let resolver = HandlerResolver::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        resolver
            .register_for(envelope_of(<PersonRegistered as Reflect>::descriptor()), recorder(Arc::clone(&log), 1))
            .register_for(
                envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
                recorder(Arc::clone(&log), 2),
            );

        resolver.dispatch(&MessageEnvelope::new(CriminalRegistered::new("foo")));

        assert_eq!(*log.lock(), [1, 2]);
    }

    #[test]
    fn maintains_order_with_interface_first() {
        let resolver = HandlerResolver::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        resolver
            .register_for(
                envelope_of(<dyn RegisteredEvent as Reflect>::descriptor()),
                recorder(Arc::clone(&log), 2),
            )
            .register_for(envelope_of(<PersonRegistered as Reflect>::descriptor()), recorder(Arc::clone(&log), 1));

        resolver.dispatch(&MessageEnvelope::new(CriminalRegistered::new("foo")));

        assert_eq!(*log.lock(), [2, 1]);
    }

    #[test]
    fn order_mirrors_registration_for_bare_messages() {
        // Broad-then-narrow and narrow-then-broad both mirror registration.
        let resolver = HandlerResolver::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        resolver
            .register::<dyn RegisteredEvent>(recorder(Arc::clone(&log), 1))
            .register::<PersonRegistered>(recorder(Arc::clone(&log), 2));
        resolver.dispatch(&PersonRegistered::new("foo"));
        assert_eq!(*log.lock(), [1, 2]);

        let reversed = HandlerResolver::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        reversed
            .register::<PersonRegistered>(recorder(Arc::clone(&log), 2))
            .register::<dyn RegisteredEvent>(recorder(Arc::clone(&log), 1));
        reversed.dispatch(&PersonRegistered::new("foo"));
        assert_eq!(*log.lock(), [2, 1]);
    }

    #[test]
    fn no_match_yields_empty_selection() {
        let resolver = HandlerResolver::new();
        let (handled, probe) = flag();
        resolver.register::<i32>(probe);

        let selected = resolver.handlers_for(&String::from("unrelated"));

        assert!(selected.is_empty());
        assert_eq!(resolver.dispatch(&String::from("unrelated")), 0);
        assert!(!handled.load(Ordering::SeqCst));
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = HandlerResolver::new();
        let (_, probe_interface) = flag();
        let (_, probe_concrete) = flag();
        resolver
            .register::<dyn RegisteredEvent>(probe_interface)
            .register::<PersonRegistered>(probe_concrete);

        let message = PersonRegistered::new("foo");
        let first = resolver.handlers_for(&message);
        let second = resolver.handlers_for(&message);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert!(Arc::ptr_eq(a, b));
        }
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn selection_snapshot_is_restartable() {
        let resolver = HandlerResolver::new();
        let (_, probe) = flag();
        resolver.register::<PersonRegistered>(probe);

        let selected = resolver.handlers_for(&PersonRegistered::new("foo"));
        let runtime = <PersonRegistered as Reflect>::descriptor();
        for entry in &selected {
            assert!(entry.should_execute_for(&runtime));
        }
        // Iterating again yields the same entries.
        assert_eq!(selected.iter().count(), selected.len());
    }

    #[test]
    fn callback_receives_the_dispatched_message() {
        let resolver = HandlerResolver::new();
        let seen = Arc::new(Mutex::new(None));
        let probe = Arc::clone(&seen);
        resolver.register::<PersonRegistered>(move |message: &dyn Message| {
            let person = message.downcast_ref::<PersonRegistered>().unwrap();
            *probe.lock() = Some(person.id.clone());
        });

        resolver.dispatch(&PersonRegistered::new("42"));

        assert_eq!(seen.lock().as_deref(), Some("42"));
    }
}
