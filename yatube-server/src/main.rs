use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use yatube_server::application::{AuthService, BlogService};
use yatube_server::data::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};
use yatube_server::infrastructure::{
    config::AppConfig,
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::{init_logging, SERVER_FILTER},
    media::MediaStorage,
};
use yatube_server::presentation::{errors::not_found_pages, routes};

/// Services shared by every actix worker.
#[derive(Clone)]
struct Services {
    auth: Arc<AuthService>,
    blog: Arc<BlogService>,
    jwt: Arc<JwtService>,
}

async fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(&config.jwt_secret).context("invalid JWT_SECRET")?);
    let media = Arc::new(MediaStorage::new(config.media_root.clone()));

    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let groups = Arc::new(PostgresGroupRepository::new(pool.clone()));
    let posts = Arc::new(PostgresPostRepository::new(pool));

    Ok(Services {
        auth: Arc::new(AuthService::new(users.clone(), jwt.clone())),
        blog: Arc::new(BlogService::new(posts, groups, users, media)),
        jwt,
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(SERVER_FILTER)?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        addr = %config.http_addr(),
        media_root = %config.media_root.display(),
        "Starting Yatube"
    );

    let services = build_services(&config).await?;
    tracing::info!("Services ready");

    let addr = config.http_addr();
    HttpServer::new(move || {
        App::new()
            .wrap(not_found_pages())
            .wrap(Logger::default())
            .app_data(web::Data::new(services.auth.clone()))
            .app_data(web::Data::new(services.blog.clone()))
            .app_data(web::Data::new(services.jwt.clone()))
            .configure(routes::configure)
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {}", addr))?
    .run()
    .await?;

    tracing::info!("Shutting down");
    Ok(())
}
