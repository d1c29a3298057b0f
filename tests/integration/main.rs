//! HTTP integration tests driving the router in-process

mod accounts;
mod circulation;
mod common;
mod reporting;
