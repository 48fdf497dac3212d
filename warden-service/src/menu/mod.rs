pub mod menu_service;
pub mod tree_builder;

pub use menu_service::{DefaultMenuService, MenuService};
pub use tree_builder::{compute_parent_path, reparent};
