pub mod auth;
pub mod authorize;
pub mod transaction;

pub use auth::auth_middleware;
pub use authorize::authorize_middleware;
pub use transaction::transaction_middleware;
