// handlers/mod.rs - two handler tiers
//
// Public (no scope) → Protected (request scope resolved by the RequestScope extractor)

pub mod protected; // /api/*
pub mod public; // /, /health
