//! Vetrina is a cached recent-posts widget runtime: a transient
//! read-through cache over host-managed content, sanitized admin
//! settings, and server-rendered widget output behind a small
//! capability trait.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
pub mod widget;
