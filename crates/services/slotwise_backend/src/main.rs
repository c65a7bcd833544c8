// File: services/slotwise_backend/src/main.rs
use axum::{routing::get, Router};
use slotwise_booking::{routes as booking_routes, BookingOptions, BookingService, BookingState};
use slotwise_common::{init_from_config, Context, SlotwiseError};
use slotwise_config::load_config;
use slotwise_db::DbClientFactory;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod service_factory;

use service_factory::{build_services, default_settings};

#[tokio::main]
async fn main() -> Result<(), SlotwiseError> {
    let config = Arc::new(load_config().context("Failed to load config")?);
    // Keeps the file appender flushing until shutdown.
    let _log_guard = init_from_config(&config.logging);

    let db = DbClientFactory::new()
        .from_app_config(&config)
        .await
        .context("Failed to connect to the database")?;
    info!("Connected to {}", db);

    let services = build_services(&config).await;
    let service = BookingService::new(
        db,
        services.gateway,
        services.notifier,
        BookingOptions::from_config(&config),
    );
    service
        .init_schema(&default_settings(&config.booking))
        .await
        .context("Failed to initialise the schema")?;

    let admin_key = config.admin.api_key.clone().filter(|k| !k.is_empty());
    if admin_key.is_none() {
        warn!("admin.api_key not set, admin routes are disabled");
    }
    let booking_state = Arc::new(BookingState {
        service: Arc::new(service),
        admin_key,
    });

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Slotwise API!" }))
        .merge(booking_routes(booking_state));

    #[allow(unused_mut)] // only the openapi feature adds to it
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use slotwise_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Slotwise API",
                version = "0.1.0",
                description = "Booking and scheduling endpoints",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
