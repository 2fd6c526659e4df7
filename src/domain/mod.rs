//! Domain layer - core pipeline logic and entities

pub mod endpoint;
pub mod pool;
