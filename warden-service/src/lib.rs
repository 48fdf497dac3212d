pub mod error;
pub mod menu;
pub mod security;

pub use error::{ServiceError, ServiceResult};
