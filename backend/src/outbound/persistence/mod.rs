//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the marketplace
//! repository ports backed by PostgreSQL via Diesel with async support
//! through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Availability and rating invariants that must hold under
//!   concurrency are enforced inside transactions here; every other rule
//!   lives in the domain services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: all database errors are mapped to the port
//!   error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/carshare")).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_booking_repository;
mod diesel_car_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_car_repository::DieselCarRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
