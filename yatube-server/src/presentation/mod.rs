pub mod auth_handlers;
pub mod errors;
pub mod forms;
pub mod http_handlers;
pub mod identity;
pub mod routes;
pub mod views;
