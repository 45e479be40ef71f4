pub mod blotato;
pub mod content;
pub mod error;
pub mod facebook;
pub mod handlers;
pub mod models;
pub mod publish;
pub mod routes;
pub mod schema;
pub mod state;
pub mod token;
