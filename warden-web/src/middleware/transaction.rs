use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use warden_infra::{ScopeOutcome, ScopeState};

use crate::extractors::Tx;
use crate::response::ApiError;
use crate::AppState;

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 事务中间件
///
/// 每个请求开一个事务作用域放进扩展。处理结束后：
/// panic 回滚并返回 500，4xx/5xx 回滚，其余提交。
/// 提交成功且有写操作请求过重载时，在返回响应前重载策略。
pub async fn transaction_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let scope = match state.store.begin().await {
        Ok(scope) => Arc::new(scope),
        Err(err) => {
            tracing::error!(error = %err, "failed to open transaction scope");
            return ApiError::internal("failed to open transaction").into_response();
        }
    };
    let scope_id = scope.id();
    request.extensions_mut().insert(Tx(scope.clone()));

    let (response, outcome) = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => {
            let status = response.status();
            let failed = status.is_client_error() || status.is_server_error();
            (response, ScopeOutcome::Completed { failed })
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            (
                ApiError::internal("internal server error").into_response(),
                ScopeOutcome::Faulted { message },
            )
        }
    };

    let scope = match Arc::try_unwrap(scope) {
        Ok(scope) => scope,
        Err(_) => {
            // 处理函数把作用域带出了请求，事务随最后一个引用回滚
            tracing::error!(scope = %scope_id, "transaction scope still referenced after request");
            return ApiError::internal("transaction scope leaked").into_response();
        }
    };

    let report = scope.finalize(outcome).await;
    if report.state == ScopeState::Committed && report.reload_policy {
        if let Err(err) = state.enforcer.reload().await {
            tracing::error!(scope = %report.id, error = %err, "policy reload after commit failed");
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::MiddlewareOptions;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use warden_api::{AuthorizationDecision, Enforcer};
    use warden_domain::security::Role;
    use crate::testing::test_state;

    /// 只记录重载次数的执行器
    #[derive(Default)]
    struct CountingEnforcer {
        reloads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Enforcer for CountingEnforcer {
        fn enforce(&self, _subject: &str, _path: &str, _method: &str) -> AuthorizationDecision {
            AuthorizationDecision::allow(None)
        }

        async fn reload(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    async fn state(enforcer: Arc<CountingEnforcer>) -> AppState {
        let mut state = test_state(MiddlewareOptions::default()).await;
        state.enforcer = enforcer;
        state
    }

    fn role(id: &str) -> Role {
        Role {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        }
    }

    async fn exploding(tx: Tx) -> StatusCode {
        tx.store().roles().create(&role("panic")).await.unwrap();
        panic!("handler exploded")
    }

    /// 写一行后按路径决定结果
    fn router(state: AppState) -> Router {
        Router::new()
            .route(
                "/ok",
                post(|tx: Tx| async move {
                    tx.store().roles().create(&role("ok")).await.unwrap();
                    tx.request_policy_reload();
                    StatusCode::OK
                }),
            )
            .route(
                "/fail",
                post(|tx: Tx| async move {
                    tx.store().roles().create(&role("fail")).await.unwrap();
                    tx.request_policy_reload();
                    StatusCode::INTERNAL_SERVER_ERROR
                }),
            )
            .route("/panic", post(exploding))
            .layer(axum::middleware::from_fn_with_state(state.clone(), transaction_middleware))
            .with_state(state)
    }

    async fn call(app: &Router, path: &str) -> StatusCode {
        let request =
            axum::http::Request::builder().method("POST").uri(path).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_success_commits_and_reloads() {
        let enforcer = Arc::new(CountingEnforcer::default());
        let state = state(enforcer.clone()).await;
        let app = router(state.clone());

        assert_eq!(call(&app, "/ok").await, StatusCode::OK);
        assert!(state.store.store().roles().get("ok").await.unwrap().is_some());
        assert_eq!(enforcer.reloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_rolls_back_without_reload() {
        let enforcer = Arc::new(CountingEnforcer::default());
        let state = state(enforcer.clone()).await;
        let app = router(state.clone());

        assert_eq!(call(&app, "/fail").await, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.store.store().roles().get("fail").await.unwrap().is_none());
        assert_eq!(enforcer.reloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panic_is_converted_and_rolled_back() {
        let enforcer = Arc::new(CountingEnforcer::default());
        let state = state(enforcer.clone()).await;
        let app = router(state.clone());

        assert_eq!(call(&app, "/panic").await, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.store.store().roles().get("panic").await.unwrap().is_none());
        assert_eq!(enforcer.reloads.load(Ordering::SeqCst), 0);

        // 故障之后仍可正常服务
        assert_eq!(call(&app, "/ok").await, StatusCode::OK);
    }
}
