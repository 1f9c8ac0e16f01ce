pub mod backend;
pub mod schema;

mod error;

pub use backend::{BackendResponse, SearchBackend};
pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
