pub mod analytics;
pub mod core;
