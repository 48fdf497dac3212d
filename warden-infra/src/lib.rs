pub mod database;
pub mod security;

pub use database::{
    AssociationStore, DatabaseManager, ScopeOutcome, ScopeReport, ScopeState, Store, StoreError,
    TransactionScope,
};
pub use security::{Claims, JwtService};
