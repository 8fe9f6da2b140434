pub mod chart;
pub mod config;
pub mod observability;
pub mod records;
pub mod server;
pub mod supply;
