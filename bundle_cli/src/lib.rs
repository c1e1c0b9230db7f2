pub mod batch;
pub mod tracing;
