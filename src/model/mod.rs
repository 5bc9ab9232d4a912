//! Data types, split by where they live.
//!
//! - [`db`]: types stored in MongoDB.
//! - [`api`]: types sent to and received from clients.
//! - [`mongodb`]: database plumbing shared by both.

pub mod api;
pub mod db;
pub mod mongodb;
