use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use viptask_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{create_cors, AuthMiddleware},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 组装服务, 账本/等级/商品匹配被任务状态机复用
    let ledger_service = LedgerService::new(pool.clone());
    let vip_service = VipService::new(pool.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let settings_service = SettingsService::new(pool.clone());

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone(), vip_service.clone());
    let task_run_service = TaskRunService::new(
        pool.clone(),
        ledger_service.clone(),
        vip_service.clone(),
        catalog_service.clone(),
    );
    let wheel_service = WheelService::new(pool.clone(), ledger_service.clone());
    let finance_service = FinanceService::new(pool.clone(), ledger_service.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(vip_service.clone()))
            .app_data(web::Data::new(task_run_service.clone()))
            .app_data(web::Data::new(wheel_service.clone()))
            .app_data(web::Data::new(finance_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::task_config)
                    .configure(handlers::wheel_config)
                    .configure(handlers::fund_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
