pub mod entities;
pub mod lifecycle;
pub mod query;
pub mod requests;
pub mod resource;
pub mod validation;

pub use console_errors::{ConsoleError, ConsoleResult, FieldError};
pub use entities::*;
pub use lifecycle::*;
pub use query::*;
pub use requests::*;
pub use resource::Resource;
