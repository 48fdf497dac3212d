//! 物化路径维护（需要读写存储的部分）

use crate::error::{ServiceError, ServiceResult};
use warden_api::query::PaginationParam;
use warden_domain::menu::{join_parent_path, rebase_parent_path, MenuQuery};
use warden_infra::TransactionScope;

/// 计算新节点的 `parent_path`
///
/// 无父节点返回空串；父节点不存在返回 `NotFound`。
pub async fn compute_parent_path(
    scope: &TransactionScope,
    parent_id: Option<&str>,
) -> ServiceResult<String> {
    let Some(parent_id) = parent_id.filter(|id| !id.is_empty()) else {
        return Ok(String::new());
    };

    let parent = scope
        .store()
        .menus()
        .get(parent_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("parent menu", parent_id))?;

    Ok(join_parent_path(&parent.parent_path, &parent.id))
}

/// 把 `old_prefix` 下全部后代的路径前缀改为 `new_prefix`
///
/// 一次前缀查询覆盖全部后代，不需要逐层遍历。返回改写的行数。
/// 必须在保存节点自身的新路径之前调用。
pub async fn reparent(
    scope: &TransactionScope,
    old_prefix: &str,
    new_prefix: &str,
) -> ServiceResult<usize> {
    let store = scope.store();
    let descendants = store
        .menus()
        .query(&MenuQuery {
            descendants_of: Some(old_prefix.to_string()),
            pagination: PaginationParam::unpaged(),
            ..Default::default()
        })
        .await?
        .list;

    let mut rewritten = 0;
    for menu in descendants {
        if let Some(path) = rebase_parent_path(&menu.parent_path, old_prefix, new_prefix) {
            store.menus().update_parent_path(&menu.id, &path).await?;
            rewritten += 1;
        }
    }

    tracing::debug!(old_prefix, new_prefix, rewritten, "menu descendants reparented");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_store;
    use warden_domain::menu::Menu;
    use warden_infra::ScopeOutcome;

    fn menu(id: &str, parent: Option<&str>, parent_path: &str) -> Menu {
        Menu {
            id: id.to_string(),
            name: id.to_string(),
            parent_id: parent.map(str::to_string),
            parent_path: parent_path.to_string(),
            ..Default::default()
        }
    }

    async fn path_of(scope: &TransactionScope, id: &str) -> String {
        scope.store().menus().get(id).await.unwrap().unwrap().parent_path
    }

    #[tokio::test]
    async fn test_compute_parent_path() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        scope.store().menus().create(&menu("A", None, "")).await.unwrap();
        scope.store().menus().create(&menu("B", Some("A"), "A")).await.unwrap();

        assert_eq!(compute_parent_path(&scope, None).await.unwrap(), "");
        assert_eq!(compute_parent_path(&scope, Some("A")).await.unwrap(), "A");
        assert_eq!(compute_parent_path(&scope, Some("B")).await.unwrap(), "A/B");
        assert!(matches!(
            compute_parent_path(&scope, Some("missing")).await,
            Err(ServiceError::NotFound(_))
        ));
        scope.finalize(ScopeOutcome::Completed { failed: true }).await;
    }

    #[tokio::test]
    async fn test_reparent_rewrites_only_descendants() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        let menus = scope.store().menus();
        menus.create(&menu("A", None, "")).await.unwrap();
        menus.create(&menu("B", Some("A"), "A")).await.unwrap();
        menus.create(&menu("C", Some("A"), "A")).await.unwrap();
        menus.create(&menu("B2", Some("A"), "A")).await.unwrap();
        menus.create(&menu("X", Some("B"), "A/B")).await.unwrap();
        menus.create(&menu("W", Some("X"), "A/B/X")).await.unwrap();
        menus.create(&menu("Y", Some("B2"), "A/B2")).await.unwrap();

        // B 从 A 下移到 C 下：B 的子节点前缀 A/B 变为 A/C/B
        let rewritten = reparent(&scope, "A/B", "A/C/B").await.unwrap();
        assert_eq!(rewritten, 2);

        assert_eq!(path_of(&scope, "X").await, "A/C/B");
        assert_eq!(path_of(&scope, "W").await, "A/C/B/X");
        assert_eq!(path_of(&scope, "Y").await, "A/B2");
        scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    }
}
