//! fast_service core - declaration model and route inference
//!
//! Provides the records the scanner extracts from service types and the pure
//! naming-convention engine that turns a method into an HTTP route.

pub mod route;
pub mod service;

pub use route::*;
pub use service::*;
