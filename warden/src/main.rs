mod config;
mod error;
mod server;

use clap::{Parser, Subcommand};
use config::Config;
use error::{Result, WardenError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use warden_domain::menu::MenuTree;
use warden_infra::{ScopeOutcome, ScopeState};
use warden_web::AppState;

#[derive(Debug, Parser)]
#[command(name = "warden", version, about = "RBAC 权限与菜单管理服务")]
struct Cli {
    /// 配置文件路径，缺省时查找 ./warden.toml 和 ~/.warden/warden.toml
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 迁移数据库后启动 HTTP 服务（默认）
    Serve,
    /// 只执行数据库迁移
    Migrate,
    /// 导入 YAML 菜单树
    Setup {
        /// 菜单文件，缺省取 setup.menu_file
        #[arg(long)]
        menu: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    server::init_tracing(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await?,
        Command::Migrate => {
            server::connect(&config).await?;
            info!("migrations applied");
        }
        Command::Setup { menu } => {
            let path = menu
                .or_else(|| config.setup.menu_file.clone())
                .ok_or_else(|| WardenError::Server("missing --menu or menu_file".to_string()))?;
            let db_manager = server::connect(&config).await?;
            let state = server::init_app_state(&config, &db_manager).await?;
            let created = setup_menus(&state, &path).await?;
            info!(created, file = %path.display(), "menu tree imported");
        }
    }
    Ok(())
}

async fn serve(config: &Config) -> Result<()> {
    info!("Starting warden...");
    let db_manager = server::connect(config).await?;
    let state = server::init_app_state(config, &db_manager).await?;
    let app = server::create_router(state, Duration::from_secs(config.server.request_timeout_secs));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| WardenError::Server(format!("failed to bind to {addr}: {e}")))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

/// 在一个事务里导入整棵菜单树，任何一步失败都整体回滚
async fn setup_menus(state: &AppState, path: &Path) -> Result<usize> {
    let content = tokio::fs::read_to_string(path).await?;
    let trees: Vec<MenuTree> = serde_yaml::from_str(&content)?;

    let scope = state.store.begin().await?;
    let created = match state.menu_service.create_menus(&scope, None, &trees).await {
        Ok(created) => created,
        Err(err) => {
            scope.finalize(ScopeOutcome::Completed { failed: true }).await;
            return Err(err.into());
        }
    };

    let report = scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    if report.state != ScopeState::Committed {
        return Err(WardenError::Server("menu import was not committed".to_string()));
    }
    Ok(created)
}
