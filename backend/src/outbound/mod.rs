//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for local runs and tests
//! - **notifications**: console and SMTP email dispatchers
//! - **receipt**: PDF booking receipts
//! - **security**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod notifications;
pub mod persistence;
pub mod receipt;
pub mod security;
