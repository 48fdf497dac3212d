pub mod menu;
pub mod reconcile;
pub mod security;

pub use reconcile::{reconcile, reconcile_by_key, Kept, ReconcileKey, Reconciliation};

use serde::{Deserialize, Deserializer};

/// 空字符串按 None 处理（前端常以 "" 表示无父节点）
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}
