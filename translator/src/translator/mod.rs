mod base;
mod mysql;

pub use base::*;
pub use mysql::*;
