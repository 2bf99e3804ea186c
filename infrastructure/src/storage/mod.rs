//! Storage adapters — where synced pages land.

mod jsonl_store;

pub use jsonl_store::JsonlPageStore;
