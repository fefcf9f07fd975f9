// skillforge — the application crate.
//
// Wires the catalog, enrollment ledger, certificate issuer, video store,
// and activity log into framework-agnostic route handlers. The web layer
// (skillforge-axum) maps HTTP onto these handlers; storage comes in through
// the core Adapter trait, injected at construction time.

pub mod activity;
pub mod actor;
pub mod context;
pub mod pagination;
pub mod range;
pub mod routes;
pub mod store;

pub use actor::{Actor, Role};
pub use context::AppContext;
