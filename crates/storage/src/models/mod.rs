mod athlete;
mod performance_metric;

pub use athlete::Athlete;
pub use performance_metric::PerformanceMetric;
