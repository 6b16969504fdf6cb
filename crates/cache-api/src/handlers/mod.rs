//! # Request Handlers

pub mod cache;
pub mod metrics;
pub mod ranking;
