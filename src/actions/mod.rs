pub mod descriptor;
pub mod error;

pub use descriptor::{ActionDescriptor, ActionTable};
pub use error::ConfigError;
