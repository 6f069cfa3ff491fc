//! HTTP handlers

pub mod health;
pub mod explain;
pub mod feedback;
pub mod admin;
