//! Translation of captured row changes into SQL statements.
//!
//! A change event names a table, an operation and one compact binary payload per affected row.
//! The [`codec`] decodes payloads, [`correlate`] pairs decoded values with columns, [`identity`]
//! resolves how rows are located, [`assemble`] builds statement value vectors and the
//! [`translator`] implementations render them as dialect specific statements with positional
//! parameters. [`registry::TranslatorRegistry`] maps dialect names to translators and
//! [`event::translate_event`] ties everything together.

pub mod assemble;
pub mod codec;
pub mod correlate;
pub mod error;
pub mod event;
pub mod identity;
mod macros;
pub mod registry;
pub mod sql;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod translator;
pub mod types;
