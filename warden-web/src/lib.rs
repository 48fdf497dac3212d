pub mod app_state;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;

pub use app_state::{AppState, MiddlewareOptions};
pub use handlers::{api_routes, health_routes};
pub use middleware::{auth_middleware, authorize_middleware, transaction_middleware};
pub use response::{ApiError, ApiResponse};
