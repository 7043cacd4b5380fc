use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use api::jwt::{JwtConfig, JwtService};
use api::repositories::{AudioRepository, SocialRepository, UserRepository};
use api::state::AppState;
use api::upload::UploadConfig;
use common::database::{DatabaseConfig, health_check, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting wavecast API service");

    // The token secret has no fallback; refuse to start without it
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(&jwt_config);

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!("API service initialized successfully");

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let social_repository = SocialRepository::new(pool.clone());
    let audio_repository = AudioRepository::new(pool.clone());
    let upload_config = UploadConfig::from_env();

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        user_repository,
        social_repository,
        audio_repository,
        upload_config,
    };

    // Start the web server
    let app = api::routes::create_router(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API service listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
