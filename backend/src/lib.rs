//! CarShare backend library: marketplace domain, HTTP adapter and driven
//! adapters for PostgreSQL, email and receipts.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
