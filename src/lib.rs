// Module layout (Clean Architecture style)
// - bootstrap: configuration, telemetry and dependency wiring
// - infrastructure: Postgres, SMTP, payment provider, object storage adapters
// - presentation: HTTP handlers, extractors and routing
// - application: ports, use cases and cross-cutting services
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
