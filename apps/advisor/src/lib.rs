//! Client-side workflow engine for the career and course recommendation
//! service: session handling, the three-step assessment wizard, the shared
//! result store, and ratings feedback and aggregation.

pub mod account;
pub mod api;
pub mod config;
pub mod errors;
pub mod insights;
pub mod models;
pub mod ratings;
pub mod session;
pub mod state;
pub mod store;
pub mod validation;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;
