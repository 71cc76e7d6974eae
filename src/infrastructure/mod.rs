//! Infrastructure layer: external adapters and runtime services

pub mod embedding;
pub mod generation;
pub mod logging;
pub mod resilience;
pub mod services;
pub mod stats;
pub mod vector_store;
