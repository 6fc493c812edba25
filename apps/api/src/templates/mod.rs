// Template configuration, source lookup, and placeholder discovery.
pub mod config;
pub mod handlers;
pub mod placeholders;
pub mod registry;
pub mod store;
pub mod validation;
