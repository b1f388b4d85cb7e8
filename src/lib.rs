//! Bilibili followed-feed exporter library.
//!
//! Scrolls a dynamics page until yesterday's posts are loaded, extracts
//! them into typed records and renders a grouped Markdown report.

pub mod config;
pub mod error;
pub mod feed;
pub mod host;
pub mod normalize;
pub mod report;
pub mod scroll;
pub mod session;
pub mod sink;
pub mod timeclass;
