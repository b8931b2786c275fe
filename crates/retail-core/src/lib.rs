pub mod calendar;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod kpi;
pub mod outputs;
pub mod pipeline;
pub mod schema;
