// Repokit Core - Error Taxonomy & Ports
// NO database driver dependencies

pub mod classify;
pub mod context;
pub mod error;
pub mod locale;
pub mod port;
pub mod response;

pub use context::{CancelHandle, Context, Interrupted};
pub use error::{BoxError, DomainError, ErrorKind, Result};
pub use locale::LocalizedMessages;
pub use response::ErrorResponse;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
