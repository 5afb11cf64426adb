//! Request middleware

pub mod concurrency;
pub mod metrics;
pub mod rate_limit;
