//! Framework layer - matching and resolution.
//!
//! This module contains the resolution pipeline:
//! - Structural type-compatibility matching ([`matches`])
//! - Handler registry with registration-order resolution ([`HandlerResolver`])

pub mod matcher;
pub mod resolver;

pub use matcher::matches;
pub use resolver::{HandlerCallback, HandlerEntry, HandlerResolver};
