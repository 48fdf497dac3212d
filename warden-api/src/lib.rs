pub mod query;
pub mod security;

pub use query::{
    OrderDirection, OrderParam, Pagination, PaginationParam, QueryResult, Status, StatusCodeError,
};

pub use security::{
    AuthenticatedUser, AuthorizationDecision, Enforcer, PolicyRule,
};
