pub mod compose;
pub mod handlers;
pub mod models;
pub mod store;
pub mod upsert;
