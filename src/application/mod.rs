//! Application services layer.

pub mod error;
pub mod provider;
pub mod repos;
pub mod settings;
