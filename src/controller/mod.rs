mod error;
pub mod subscriptions;
pub mod weather;

pub use error::{RestError, RestResult};
