//! API handlers, one module per resource

pub mod catalog;
pub mod cron;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod projects;
pub mod requests;
