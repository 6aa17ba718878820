//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, AccountQuery, BookingCommand, BookingQuery, BookingRepository, CarCommand,
    CarQuery, CarRepository, NotificationDispatcher, PasswordHasher, ReceiptRenderer,
    ReviewCommand, ReviewQuery, ReviewRepository, UserRepository,
};
use crate::domain::{AccountService, BookingService, CarService, ReviewService};

/// Driven adapters the marketplace services are built from.
pub struct MarketplaceAdapters<U, C, B, R> {
    pub users: Arc<U>,
    pub cars: Arc<C>,
    pub bookings: Arc<B>,
    pub reviews: Arc<R>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub receipts: Arc<dyn ReceiptRenderer>,
    pub clock: Arc<dyn Clock>,
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub cars: Arc<dyn CarCommand>,
    pub cars_query: Arc<dyn CarQuery>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub reviews_query: Arc<dyn ReviewQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub cars: Arc<dyn CarCommand>,
    pub cars_query: Arc<dyn CarQuery>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub reviews_query: Arc<dyn ReviewQuery>,
}

impl HttpStatePorts {
    /// Build every domain service over one set of driven adapters.
    pub fn wire<U, C, B, R>(adapters: MarketplaceAdapters<U, C, B, R>) -> Self
    where
        U: UserRepository + 'static,
        C: CarRepository + 'static,
        B: BookingRepository + 'static,
        R: ReviewRepository + 'static,
    {
        let MarketplaceAdapters {
            users,
            cars,
            bookings,
            reviews,
            hasher,
            notifier,
            receipts,
            clock,
        } = adapters;

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&users),
            hasher,
            Arc::clone(&notifier),
            Arc::clone(&clock),
        ));
        let car_service = Arc::new(CarService::new(
            Arc::clone(&cars),
            Arc::clone(&bookings),
            Arc::clone(&reviews),
            Arc::clone(&users),
            Arc::clone(&clock),
        ));
        let booking_service = Arc::new(BookingService::new(
            Arc::clone(&bookings),
            cars,
            Arc::clone(&users),
            receipts,
            notifier,
            Arc::clone(&clock),
        ));
        let review_service = Arc::new(ReviewService::new(reviews, bookings, users, clock));

        Self {
            accounts: accounts.clone(),
            accounts_query: accounts,
            cars: car_service.clone(),
            cars_query: car_service,
            bookings: booking_service.clone(),
            bookings_query: booking_service,
            reviews: review_service.clone(),
            reviews_query: review_service,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::NoOpNotificationDispatcher;
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts, MarketplaceAdapters};
    /// use backend::outbound::memory::InMemoryMarketplace;
    /// use backend::outbound::receipt::PdfReceiptRenderer;
    /// use backend::outbound::security::Argon2PasswordHasher;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryMarketplace::new());
    /// let ports = HttpStatePorts::wire(MarketplaceAdapters {
    ///     users: store.clone(),
    ///     cars: store.clone(),
    ///     bookings: store.clone(),
    ///     reviews: store,
    ///     hasher: Arc::new(Argon2PasswordHasher::default()),
    ///     notifier: Arc::new(NoOpNotificationDispatcher),
    ///     receipts: Arc::new(PdfReceiptRenderer),
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let state = HttpState::new(ports);
    /// let _bookings = state.bookings.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            accounts_query,
            cars,
            cars_query,
            bookings,
            bookings_query,
            reviews,
            reviews_query,
        } = ports;
        Self {
            accounts,
            accounts_query,
            cars,
            cars_query,
            bookings,
            bookings_query,
            reviews,
            reviews_query,
        }
    }
}
