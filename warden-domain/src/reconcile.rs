//! 集合对账
//!
//! 对比已存储的子集合与提交的子集合，按键划分为新增、删除、保留三组。
//! 菜单动作、动作资源、角色授权、用户角色四类关联共用这一个实现。

use indexmap::IndexMap;
use std::hash::Hash;

/// 键在新旧两侧都存在的成员
#[derive(Debug, Clone, PartialEq)]
pub struct Kept<T> {
    pub old: T,
    pub new: T,
}

/// 对账结果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T> {
    /// 只在新集合中出现（取新值）
    pub to_add: Vec<T>,
    /// 只在旧集合中出现（取旧值，删除需要旧记录的ID）
    pub to_remove: Vec<T>,
    /// 两侧都有，不做任何修改；需要字段级更新的调用方自行比较
    pub kept: Vec<Kept<T>>,
}

impl<T> Reconciliation<T> {
    pub fn is_unchanged(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// 对账键
pub trait ReconcileKey {
    type Key: Hash + Eq;

    fn reconcile_key(&self) -> Self::Key;
}

fn index_by<T, K, F>(items: Vec<T>, key_of: &F) -> IndexMap<K, T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut map = IndexMap::with_capacity(items.len());
    for item in items {
        // 重复键后写覆盖前写
        map.insert(key_of(&item), item);
    }
    map
}

/// 按 `key_of` 对比 `old` 与 `new`
///
/// 输出顺序：`to_add`、`kept` 按键在 `new` 中首次出现的顺序，`to_remove` 按 `old` 的顺序。
pub fn reconcile<T, K, F>(old: Vec<T>, new: Vec<T>, key_of: F) -> Reconciliation<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut old_slots: IndexMap<K, Option<T>> = index_by(old, &key_of)
        .into_iter()
        .map(|(key, item)| (key, Some(item)))
        .collect();
    let new_map = index_by(new, &key_of);

    let mut to_add = Vec::new();
    let mut kept = Vec::new();
    for (key, item) in new_map {
        match old_slots.get_mut(&key).and_then(Option::take) {
            Some(old) => kept.push(Kept { old, new: item }),
            None => to_add.push(item),
        }
    }

    let to_remove = old_slots.into_values().flatten().collect();

    Reconciliation {
        to_add,
        to_remove,
        kept,
    }
}

/// 使用类型自身的对账键
pub fn reconcile_by_key<T: ReconcileKey>(old: Vec<T>, new: Vec<T>) -> Reconciliation<T> {
    reconcile(old, new, T::reconcile_key)
}
