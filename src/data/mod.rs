pub mod database;
pub mod filters;
pub mod guard;
pub mod posts;
pub mod profiles;
pub mod query;
