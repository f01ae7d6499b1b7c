// Test modules

pub mod common;
mod dashboard_test;
mod history_service_test;
