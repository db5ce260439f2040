pub mod error;
pub mod models;

pub use error::{HarnessError, Result};
pub use models::*;
