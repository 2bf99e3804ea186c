//! Use cases — application workflows composed from ports.

pub mod sync_repository;
