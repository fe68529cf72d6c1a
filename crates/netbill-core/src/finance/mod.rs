pub mod financing;
pub mod metrics;
