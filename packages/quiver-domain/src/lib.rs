pub mod bind;
pub mod compile;
pub mod query;
pub mod scope;

mod error;

pub use error::{Error, Result};
pub use query::{Parameter, QueryBody, QueryDef, ResultField};
pub use scope::{ExecutionScope, Namespace};
