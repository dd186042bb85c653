//! 产品服务主入口

use product_service::{
    auth::JwtService,
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{
        CredentialStore, InMemoryProductRepository, InMemoryUserRepository, PgProductRepository,
        PgUserRepository, ProductStore,
    },
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("product-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    if let Ok(name) = std::env::var("PRODUCT_ENV") {
        dotenv::from_filename(format!(".env.{}", name)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置（签名配置缺失时直接退出）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Product service starting...");

    // 3. 签名服务（进程内唯一，只读）
    let jwt_service = Arc::new(JwtService::new(&config.jwt)?);

    // 4. 存储：配置了数据库则用 PostgreSQL，否则用内存
    let enforce_unique_login = config.auth.enforce_unique_login;
    let (credential_store, product_store): (Arc<dyn CredentialStore>, Arc<dyn ProductStore>) =
        match &config.database.url {
            Some(url) => {
                let db_pool = db::create_pool(&config.database, url).await?;
                db::run_migrations(&db_pool).await?;
                tracing::info!("Database initialized");

                (
                    Arc::new(PgUserRepository::new(db_pool.clone(), enforce_unique_login)),
                    Arc::new(PgProductRepository::new(db_pool)),
                )
            }
            None => {
                tracing::warn!("No database configured, using in-memory storage");
                (
                    Arc::new(InMemoryUserRepository::new(enforce_unique_login)),
                    Arc::new(InMemoryProductRepository::new()),
                )
            }
        };

    let app_state = Arc::new(AppState::new(credential_store, product_store, jwt_service));

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, enforce_unique_login, "Server listening");

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 给进行中的请求留出时间，超时后强制退出
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("product-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: product-service [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  PRODUCT_JWT__SECRET           签名密钥（必填，至少 32 字符）");
    println!("  PRODUCT_JWT__ISSUER           令牌签发者（必填）");
    println!("  PRODUCT_JWT__AUDIENCE         令牌受众（必填）");
    println!("  PRODUCT_JWT__EXPIRATION_HOURS 令牌有效期，小时（必填）");
    println!("  PRODUCT_DATABASE__URL         PostgreSQL 连接串（可选，缺省使用内存存储）");
    println!("  PRODUCT_AUTH__ENFORCE_UNIQUE_LOGIN  是否拒绝重复登录名（默认 true）");
}
