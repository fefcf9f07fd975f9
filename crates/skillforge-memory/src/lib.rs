// skillforge-memory — in-memory document-store adapter.
//
// HashMap-backed implementation of the core Adapter trait. Used by the
// test suites and as the reference implementation of adapter semantics.

pub mod adapter;

pub use adapter::MemoryAdapter;
