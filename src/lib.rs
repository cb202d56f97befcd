pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod middleware;
pub mod resource;
pub mod routes;
pub mod scope;
pub mod server;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use routes::app;
pub use state::AppState;
