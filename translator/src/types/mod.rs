//! Common types used throughout the translator.
//!
//! Re-exports the decoded value type, table metadata supplied by the schema registry and the
//! generated statement type.

mod cell;
mod mutation;
mod schema;

pub use cell::*;
pub use mutation::*;
pub use schema::*;
