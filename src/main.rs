#![warn(clippy::all)]

use tracing_subscriber::fmt::format::FmtSpan;

use student_hub::{build_routes, config, setup_store};

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    dotenv::dotenv().ok();
    let config = config::Config::new()?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "handle_errors={},student_hub={},warp={}",
            config.log_level, config.log_level, config.log_level
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let store = setup_store(&config).await?;

    let routes = build_routes(store);

    tracing::info!(
        "student-hub {} listening on {}",
        env!("CARGO_PKG_VERSION"),
        config.port
    );

    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;

    Ok(())
}
