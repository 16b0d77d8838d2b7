// Presentation layer - HTTP handlers, routes and error mapping
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod router;
pub mod wizard_handlers;
