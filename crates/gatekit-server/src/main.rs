//! gatekit HTTP Server
//!
//! Axum-based backend for the static site: donation checkout, the paid
//! contact form and the document upload endpoint.
//!
//! Paid actions run through hosted checkout with single-use capability
//! tokens; completion is observed by client polling, never by webhooks.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatekit_core::{CheckoutGateway, ContactIntent, DonationIntent, FlowBroker};
use gatekit_mail::{FileMailer, Mailer, SmtpMailer};
use gatekit_payments::StripeGateway;

use crate::config::ServerConfig;
use crate::routes::{contact, donation, health_check, upload};
use crate::state::AppState;

/// How often used and expired tokens are dropped from the stores.
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = Arc::new(ServerConfig::from_env());
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    // Outbound mail transport
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(settings) => {
            let smtp = SmtpMailer::new(settings)?;
            tracing::info!("✓ SMTP transport configured ({})", settings.host);
            Arc::new(smtp)
        }
        None => {
            let spool = std::env::temp_dir().join("gatekit-mail");
            tracing::warn!("⚠ SMTP not configured - spooling mail to files");
            tracing::warn!("  Set SMTP_HOST, SMTP_USER and SMTP_PASS in .env");
            tracing::warn!("  Spool directory: {}", spool.display());
            Arc::new(FileMailer::new(spool))
        }
    };

    // Hosted checkout gateway
    let gateway: Option<Arc<dyn CheckoutGateway>> = match StripeGateway::from_env() {
        Ok(stripe) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(err) => {
            tracing::warn!("⚠ Stripe not configured - paid flows disabled ({err})");
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
    };

    // One broker per flow, so a donation token can never open a
    // contact flow or the other way round
    let donation_broker = gateway
        .as_ref()
        .map(|g| Arc::new(FlowBroker::<DonationIntent>::new("donation", g.clone())));
    let contact_broker = gateway
        .as_ref()
        .map(|g| Arc::new(FlowBroker::<ContactIntent>::new("contact", g.clone())));

    if let Some(broker) = &donation_broker {
        spawn_sweeper(broker.clone());
    }
    if let Some(broker) = &contact_broker {
        spawn_sweeper(broker.clone());
    }

    // Build application state
    let state = AppState {
        config: config.clone(),
        donations: donation_broker,
        contact: contact_broker,
        mailer,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        // Donation flow
        .route("/donate", post(donation::donation_start))
        .route("/donate/success", get(donation::donation_success))
        .route("/donate/info", get(donation::donation_info))
        .route("/donate/cancel", get(donation::donation_cancel))
        // Contact flow
        .route("/mail", post(contact::contact_send))
        .route("/mail/checkout", post(contact::contact_checkout))
        .route("/mail/fee", get(contact::contact_fee))
        .route("/mail/success", get(contact::contact_success))
        .route("/mail/info", get(contact::contact_info))
        .route("/mail/cancel", get(contact::contact_cancel))
        // Uploads
        .route("/upload/document", post(upload::upload_document))
        // Static site
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 gatekit server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /donate          - Start a donation checkout");
    tracing::info!("  GET  /donate/info     - Donation payment status");
    tracing::info!("  POST /mail            - Send a contact message");
    tracing::info!("  POST /mail/checkout   - Paid contact submission");
    tracing::info!("  GET  /mail/fee        - Contact fee info");
    tracing::info!("  POST /upload/document - Stage a contact attachment");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop used and expired tokens from a broker's store.
fn spawn_sweeper<I>(broker: Arc<FlowBroker<I>>)
where
    I: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_PERIOD);
        loop {
            ticker.tick().await;
            let removed = broker.sweep();
            if removed > 0 {
                tracing::debug!(removed, "token sweep");
            }
        }
    });
}
