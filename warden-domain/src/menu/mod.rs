mod model;
pub mod tree;

pub use model::{
    Menu, MenuAction, MenuActionQuery, MenuActionResource, MenuActionResourceQuery, MenuQuery,
    MenuTree, HIDDEN, VISIBLE,
};
pub use tree::{
    flatten, join_parent_path, rebase_parent_path, split_parent_ids, to_tree, PATH_SEPARATOR,
};
