//! Testing utilities for binlog translation.
//!
//! - [`table`] - Table metadata fixtures covering every identity layout.
//! - [`payload`] - Builders that encode row payloads in the layouts change logs emit.
pub mod payload;
pub mod table;
