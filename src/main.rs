//! motoroute binary
//!
//! `serve` (the default) starts the HTTP API; `generate` produces a single
//! route on the command line; `config` prints a configuration template.

use clap::Parser;
use motoroute::cli::{API_KEY_ENV, Cli, Command, generate_config_template};
use motoroute::config::ServiceConfig;
use motoroute::handlers::{self, AppState};
use motoroute::maps::{google_maps_url, route_description};
use motoroute::metrics::Metrics;
use motoroute::models::GenerateRouteParams;
use motoroute::service::RouteGenerationService;
use motoroute::telemetry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config { output } => write_template(output.as_deref()),
        Command::Serve => serve(load_config(&cli.config)?).await,
        command @ Command::Generate { .. } => {
            let params = command
                .generate_params()
                .ok_or("generate parameters missing")??;
            let output = match command {
                Command::Generate { output, .. } => output,
                _ => None,
            };
            generate(load_config(&cli.config)?, params, output.as_deref()).await
        }
    }
}

fn load_config(path: &str) -> Result<Arc<ServiceConfig>, Box<dyn std::error::Error>> {
    let api_key = std::env::var(API_KEY_ENV).ok();
    let config = ServiceConfig::from_file_with_api_key(path, api_key)?;
    telemetry::init(&config.observability.log_level);
    Ok(Arc::new(config))
}

fn write_template(output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let template = generate_config_template();
    match output {
        Some(path) => {
            std::fs::write(path, template)?;
            eprintln!("Configuration template written to {}", path);
        }
        None => print!("{}", template),
    }
    Ok(())
}

async fn serve(config: Arc<ServiceConfig>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.socket_addr()?;

    tracing::info!(
        model = %config.model_name(),
        region = %config.bounds().region(),
        max_retries = config.max_retries(),
        "Starting motoroute server on {}",
        addr
    );

    let app = handlers::router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Route generation available at http://{}/api/routes/generate", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn generate(
    config: Arc<ServiceConfig>,
    params: GenerateRouteParams,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = RouteGenerationService::new(config, Arc::new(Metrics::new()?))?;

    // Ctrl-C cancels the in-flight call
    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let route = service.generate_route_until(&params, cancel).await?;

    let json = serde_json::to_string_pretty(&route)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            eprintln!("Route written to {}", path);
        }
        None => println!("{}", json),
    }

    if let Some(description) = route_description(route.route_points(), params.distance()) {
        eprintln!("{}", description);
    }
    if let Some(url) = google_maps_url(route.route_points()) {
        eprintln!("Open in Google Maps: {}", url);
    }

    Ok(())
}
