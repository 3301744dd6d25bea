pub mod athletes;
pub mod metrics;
