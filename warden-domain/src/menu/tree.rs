//! 物化路径与菜单树组装
//!
//! 这里只有纯函数，需要查库的部分（计算父路径、迁移后代）在服务层。

use crate::menu::{Menu, MenuTree};
use std::collections::HashMap;

pub const PATH_SEPARATOR: char = '/';

/// 拼接父路径：`parent_path/parent_id`，父路径为空时就是 `parent_id`
pub fn join_parent_path(parent_path: &str, parent_id: &str) -> String {
    if parent_path.is_empty() {
        parent_id.to_string()
    } else {
        format!("{parent_path}{PATH_SEPARATOR}{parent_id}")
    }
}

/// 把 `path` 中的 `old_prefix` 替换为 `new_prefix`，保留余下部分
///
/// 只匹配完整的路径段：`A/B` 是 `A/B/X` 的前缀，但不是 `A/B2/Y` 的前缀。
/// 不在 `old_prefix` 之下的路径返回 None。
pub fn rebase_parent_path(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if path == old_prefix {
        return Some(new_prefix.to_string());
    }
    let rest = path.strip_prefix(old_prefix)?;
    let rest = rest.strip_prefix(PATH_SEPARATOR)?;
    Some(join_parent_path(new_prefix, rest))
}

/// 拆分物化路径得到全部祖先ID（从根到父）
pub fn split_parent_ids(parent_path: &str) -> Vec<&str> {
    parent_path
        .split(PATH_SEPARATOR)
        .filter(|id| !id.is_empty())
        .collect()
}

/// 把扁平列表组装为森林
///
/// 父节点不在列表中的节点作为根。兄弟节点保持输入顺序。
pub fn to_tree(menus: Vec<Menu>) -> Vec<MenuTree> {
    let index: HashMap<String, usize> = menus
        .iter()
        .enumerate()
        .map(|(i, menu)| (menu.id.clone(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); menus.len()];
    let mut roots = Vec::new();
    for (i, menu) in menus.iter().enumerate() {
        match menu.parent_id.as_ref().and_then(|pid| index.get(pid)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<MenuTree>> =
        menus.into_iter().map(|m| Some(MenuTree::from(m))).collect();
    let mut forest: Vec<MenuTree> = roots
        .iter()
        .filter_map(|&root| assemble(root, &mut slots, &children))
        .collect();

    // 成环的节点从任何根都不可达，按根处理
    for i in 0..slots.len() {
        if let Some(tree) = assemble(i, &mut slots, &children) {
            forest.push(tree);
        }
    }
    forest
}

fn assemble(i: usize, slots: &mut [Option<MenuTree>], children: &[Vec<usize>]) -> Option<MenuTree> {
    let mut node = slots[i].take()?;
    node.children = children[i]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(node)
}

/// 先序展开森林
pub fn flatten(trees: &[MenuTree]) -> Vec<Menu> {
    let mut menus = Vec::new();
    for tree in trees {
        menus.push(tree.to_menu());
        menus.extend(flatten(&tree.children));
    }
    menus
}
