use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use warden_infra::{AssociationStore, DatabaseManager, JwtService};
use warden_service::menu::DefaultMenuService;
use warden_service::security::{
    AuthService, DefaultPasswordService, DefaultRoleService, DefaultUserService, PolicyEnforcer,
    PolicyGraphLoader,
};
use warden_web::AppState;

use crate::config::{Config, LogFormat};
use crate::error::Result;

/// 初始化日志，RUST_LOG 覆盖配置里的级别
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log.format {
        LogFormat::Json => builder.json().try_init()?,
        LogFormat::Text => builder.try_init()?,
    }
    Ok(())
}

/// 连接数据库并执行迁移
pub async fn connect(config: &Config) -> Result<DatabaseManager> {
    let db =
        warden_migration::connect_and_migrate(config.database.options().connect_options()).await?;
    tracing::info!("database connected and migrated");
    Ok(DatabaseManager::from_connection(db))
}

/// 创建路由
///
/// 请求经过的顺序（由外到内）：
/// trace -> CORS -> timeout -> transaction -> auth -> authorize -> handler
/// `/health` 不进事务，也不做认证和授权
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let api = warden_web::api_routes().layer(
        ServiceBuilder::new()
            .layer(TimeoutLayer::new(request_timeout))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                warden_web::transaction_middleware,
            ))
            .layer(axum::middleware::from_fn_with_state(state.clone(), warden_web::auth_middleware))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                warden_web::authorize_middleware,
            )),
    );

    Router::new()
        .merge(api)
        .merge(warden_web::health_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// 初始化应用状态
///
/// 启动时先加载一次策略；开启 `policy.auto_load` 时再起定时重载任务。
pub async fn init_app_state(config: &Config, db_manager: &DatabaseManager) -> Result<AppState> {
    let store = AssociationStore::new(db_manager.primary_db());

    let password_service =
        Arc::new(DefaultPasswordService::new().with_bcrypt_cost(config.security.bcrypt_cost));
    let user_service = Arc::new(DefaultUserService::new(
        config.super_admin.to_super_admin(),
        password_service,
    ));

    let jwt_service = Arc::new(JwtService::new(
        &config.security.jwt_secret,
        config.security.jwt_issuer.clone(),
        config.security.jwt_expiration,
    ));
    let auth_service = Arc::new(AuthService::new(jwt_service, user_service.clone()));

    let enforcer = Arc::new(PolicyEnforcer::new(
        PolicyGraphLoader::new(store.clone()),
        config.super_admin.username.clone(),
    ));
    enforcer.reload_policy().await?;
    if config.policy.enable && config.policy.auto_load {
        let interval = Duration::from_secs(config.policy.auto_load_interval_secs.max(1));
        enforcer.clone().spawn_auto_reload(interval);
        tracing::info!(interval_secs = interval.as_secs(), "policy auto reload enabled");
    }

    Ok(AppState {
        store,
        enforcer,
        auth_service,
        menu_service: Arc::new(DefaultMenuService::new()),
        role_service: Arc::new(DefaultRoleService::new()),
        user_service,
        options: Arc::new(config.middleware_options()),
    })
}
