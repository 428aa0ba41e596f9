pub mod catalog;
pub mod handlers;
pub mod models;
pub mod store;
