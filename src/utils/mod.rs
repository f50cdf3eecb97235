//! Utility Module
//!
//! - [`NamedList`]: insertion-ordered collection keyed by unique names

pub mod named_list;

pub use named_list::{Named, NamedList};
