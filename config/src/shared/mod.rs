//! Configuration sections of the drainer.

mod base;
mod drainer;
mod source;
mod translator;

pub use base::ValidationError;
pub use drainer::DrainerConfig;
pub use source::SourceConfig;
pub use translator::TranslatorConfig;
