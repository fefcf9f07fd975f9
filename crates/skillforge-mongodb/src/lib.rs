// skillforge-mongodb — MongoDB document-store adapter.
//
// Concrete implementation of the core Adapter trait on the official MongoDB
// Rust driver. Collections are addressed by model name; the `id` field maps
// to `_id`; the named sequences behind certificate numbering live in a
// `counters` collection advanced with an atomic upsert.

pub mod adapter;
pub mod query;

pub use adapter::MongoAdapter;
