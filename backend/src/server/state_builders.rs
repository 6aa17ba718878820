//! Builders for HTTP state over the configured driven adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use backend::domain::ports::{NotificationDispatcher, PasswordHasher, ReceiptRenderer};
use backend::inbound::http::state::{HttpState, HttpStatePorts, MarketplaceAdapters};
use backend::outbound::memory::InMemoryMarketplace;
use backend::outbound::notifications::{
    BackgroundNotificationDispatcher, ConsoleNotificationDispatcher, SmtpNotificationDispatcher,
};
use backend::outbound::persistence::{
    DieselBookingRepository, DieselCarRepository, DieselReviewRepository, DieselUserRepository,
};
use backend::outbound::receipt::PdfReceiptRenderer;
use backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Adapters shared by both storage backends.
struct SharedAdapters {
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn NotificationDispatcher>,
    receipts: Arc<dyn ReceiptRenderer>,
    clock: Arc<dyn Clock>,
}

/// Pick the email transport: SMTP when configured, otherwise the log.
///
/// Either way delivery happens on a background task so request latency
/// never depends on the relay.
fn build_notifier(config: &ServerConfig) -> std::io::Result<Arc<dyn NotificationDispatcher>> {
    let inner: Arc<dyn NotificationDispatcher> = match config.mail.clone() {
        Some(settings) => {
            let host = settings.host.clone();
            let dispatcher = SmtpNotificationDispatcher::new(settings)
                .map_err(|err| std::io::Error::other(format!("SMTP setup failed: {err}")))?;
            info!(%host, "delivering email through SMTP relay");
            Arc::new(dispatcher)
        }
        None => {
            warn!("no SMTP relay configured; emails will be logged only");
            Arc::new(ConsoleNotificationDispatcher::new(
                config.frontend_url.clone(),
            ))
        }
    };
    Ok(Arc::new(BackgroundNotificationDispatcher::new(inner)))
}

fn shared_adapters(config: &ServerConfig) -> std::io::Result<SharedAdapters> {
    Ok(SharedAdapters {
        hasher: Arc::new(Argon2PasswordHasher::default()),
        notifier: build_notifier(config)?,
        receipts: Arc::new(PdfReceiptRenderer),
        clock: Arc::new(DefaultClock),
    })
}

/// Build HTTP state, backed by PostgreSQL when a pool is configured and by
/// the in-memory marketplace otherwise.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the SMTP transport cannot be set up.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let SharedAdapters {
        hasher,
        notifier,
        receipts,
        clock,
    } = shared_adapters(config)?;

    let ports = match &config.db_pool {
        Some(pool) => HttpStatePorts::wire(MarketplaceAdapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            cars: Arc::new(DieselCarRepository::new(pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
            hasher,
            notifier,
            receipts,
            clock,
        }),
        None => {
            warn!("no database configured; marketplace data lives in memory only");
            let store = Arc::new(InMemoryMarketplace::new());
            HttpStatePorts::wire(MarketplaceAdapters {
                users: Arc::clone(&store),
                cars: Arc::clone(&store),
                bookings: Arc::clone(&store),
                reviews: store,
                hasher,
                notifier,
                receipts,
                clock,
            })
        }
    };

    Ok(web::Data::new(HttpState::new(ports)))
}
