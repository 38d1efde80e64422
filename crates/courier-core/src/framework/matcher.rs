//! Structural type-compatibility matching.
//!
//! The matcher decides whether a message of some runtime type should be
//! delivered to a handler registered against a declared type. Direct
//! assignability alone is not enough: a handler declared for "envelope of
//! `Animal`" must fire for an envelope of `Dog`, which requires recursing
//! into generic type arguments rather than relying on any built-in variance
//! rules.
//!
//! # Algorithm
//!
//! `matches(runtime, declared)` proceeds in order:
//!
//! 1. If `declared` is directly assignable from `runtime` (identity,
//!    subclassing, or interface implementation), match. This settles the
//!    common non-generic case cheaply, and also lets the untyped envelope
//!    interface match any envelope.
//! 2. If either side is non-generic, no match - there is nothing left to
//!    recurse into.
//! 3. The unparameterized definition of `declared` must be assignable from
//!    the unparameterized definition of `runtime` (both sides must be
//!    "envelope-of-something", say).
//! 4. The type-argument lists must have equal length. An arity mismatch is a
//!    non-match, not an error; it cannot arise from well-formed descriptors.
//! 5. Each pair of corresponding type arguments must match, recursively.
//!
//! The recursion composes arbitrarily deep, so "envelope of sequence of
//! `Animal`" matches "envelope of sequence of `Dog`". Depth is bounded by the
//! nesting of generic arguments, and the function is total: it never panics
//! and never errors.

use crate::foundation::descriptor::TypeDescriptor;

/// Tests whether a message of type `runtime` is compatible with a handler
/// declared for type `declared`.
///
/// Pure function of the two descriptors; it does not look at message values.
pub fn matches(runtime: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
    if declared.is_assignable_from(runtime) {
        return true;
    }

    if !declared.is_generic() || !runtime.is_generic() {
        return false;
    }

    if !declared.definition().is_assignable_from(&runtime.definition()) {
        return false;
    }

    let declared_args = declared.type_args();
    let runtime_args = runtime.type_args();
    if declared_args.len() != runtime_args.len() {
        return false;
    }

    declared_args
        .iter()
        .zip(runtime_args)
        .all(|(declared, runtime)| matches(runtime, declared))
}
