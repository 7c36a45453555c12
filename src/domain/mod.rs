//! Core record and settings types.

pub mod items;
pub mod settings;
