// handlers/protected/mod.rs - scoped handlers
//
// Every handler here takes a `RequestScope` as its first extractor after
// `State`, so an unauthenticated non-demo request is rejected before the
// handler body, and therefore the store, is reached.

pub mod auth;
pub mod data;
pub mod describe;
pub mod stats;
