pub mod auth;
pub mod config;
pub mod enums;
pub mod errors;
pub mod routes;
pub mod structures;
