//! Configuration of the change log drainer.
//!
//! Settings are layered from a base file, an environment specific file and `APP_` prefixed
//! environment variables, see [`load::load_config`].

mod environment;
pub mod load;
pub mod shared;

pub use environment::Environment;
