//! Client adapter implementations

pub mod memory;

pub use memory::InMemoryClient;
