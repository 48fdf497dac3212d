use crate::database::error::{StoreContext, StoreError};
use crate::database::repository::Store;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// 请求结束时的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// 业务逻辑正常返回；`failed` 表示结果属于客户端或服务端错误
    Completed { failed: bool },
    /// 业务逻辑发生未恢复的故障（panic）
    Faulted { message: String },
}

/// 作用域的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Committed,
    RolledBack,
}

/// 结束报告
#[derive(Debug)]
pub struct ScopeReport {
    pub id: Uuid,
    pub state: ScopeState,
    /// 提交成功且有写操作请求过重载
    pub reload_policy: bool,
    /// 提交或回滚本身失败
    pub error: Option<StoreError>,
}

/// 请求级事务作用域
///
/// 每个请求打开一次，写操作通过 [`Self::store`] 落在同一个事务里。
/// [`Self::finalize`] 消费 `self`，保证只结束一次；未结束就被丢弃时（取消、超时）
/// 底层事务在 drop 时回滚。
pub struct TransactionScope {
    id: Uuid,
    txn: DatabaseTransaction,
    reload_requested: AtomicBool,
}

impl TransactionScope {
    /// 开启事务
    pub async fn open(db: &DatabaseConnection) -> Result<Self, StoreError> {
        let txn = db.begin().await.context("begin transaction")?;
        let id = Uuid::new_v4();
        tracing::debug!(scope = %id, "transaction scope opened");
        Ok(Self {
            id,
            txn,
            reload_requested: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 绑定到本事务的存储
    pub fn store(&self) -> Store<'_, DatabaseTransaction> {
        Store::new(&self.txn)
    }

    pub fn connection(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// 标记本次请求改动了权限图，提交后需要重载策略
    pub fn request_policy_reload(&self) {
        self.reload_requested.store(true, Ordering::Release);
    }

    pub fn policy_reload_requested(&self) -> bool {
        self.reload_requested.load(Ordering::Acquire)
    }

    /// 按结果提交或回滚
    pub async fn finalize(self, outcome: ScopeOutcome) -> ScopeReport {
        let id = self.id;
        let reload_requested = self.policy_reload_requested();

        match outcome {
            ScopeOutcome::Completed { failed: false } => match self.txn.commit().await {
                Ok(()) => {
                    tracing::debug!(scope = %id, "transaction committed");
                    ScopeReport {
                        id,
                        state: ScopeState::Committed,
                        reload_policy: reload_requested,
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::error!(scope = %id, error = %err, "transaction commit failed");
                    // 提交失败视为未提交，不触发重载
                    ScopeReport {
                        id,
                        state: ScopeState::RolledBack,
                        reload_policy: false,
                        error: Some(StoreError::new("commit transaction", err)),
                    }
                }
            },
            ScopeOutcome::Completed { failed: true } => {
                tracing::warn!(scope = %id, "request failed, rolling back transaction");
                Self::rollback(id, self.txn).await
            }
            ScopeOutcome::Faulted { message } => {
                tracing::error!(
                    scope = %id,
                    fault = %message,
                    "request faulted, rolling back transaction"
                );
                Self::rollback(id, self.txn).await
            }
        }
    }

    async fn rollback(id: Uuid, txn: DatabaseTransaction) -> ScopeReport {
        let error = match txn.rollback().await {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(scope = %id, error = %err, "transaction rollback failed");
                Some(StoreError::new("rollback transaction", err))
            }
        };
        ScopeReport {
            id,
            state: ScopeState::RolledBack,
            reload_policy: false,
            error,
        }
    }
}
