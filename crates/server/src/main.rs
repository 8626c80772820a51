use db::DBService;
use server::{AppState, routes};
use services::services::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init("server=info,db=info,services=info,tower_http=info,warn");

    let config = Config::from_env()?;
    let db = DBService::new(&config.database_url).await?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(db, config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
