use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use vantage_server::{build_router, PaymentLinkMode, ShopState};

/// Unpaid bookings are cancelled after this long.
const PAYMENT_WINDOW_MINS: i64 = 15;
/// How often the expiry sweep runs.
const EXPIRY_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let link_mode = match std::env::var("PAYMENT_MODE").as_deref() {
        Ok("live") => match std::env::var("PAYMENT_CHECKOUT_URL") {
            Ok(base) => PaymentLinkMode::Live {
                checkout_base: base.trim_end_matches('/').to_string(),
            },
            Err(_) => {
                tracing::warn!("PAYMENT_MODE=live without PAYMENT_CHECKOUT_URL, using sandbox");
                PaymentLinkMode::Sandbox
            }
        },
        _ => PaymentLinkMode::Sandbox,
    };
    tracing::info!(?link_mode, "payment links");

    let state = Arc::new(ShopState::new(link_mode));
    state.seed_demo_data();

    // Sweep for bookings whose payment never arrived.
    let sweep_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(EXPIRY_SWEEP_SECS));
        loop {
            interval.tick().await;
            let expired = sweep_state.expire_stale_pending(
                chrono::Duration::minutes(PAYMENT_WINDOW_MINS),
                chrono::Utc::now(),
            );
            if expired > 0 {
                tracing::info!(expired, "expired unpaid bookings");
            }
        }
    });

    let app = build_router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
