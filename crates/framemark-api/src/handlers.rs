//! Request handlers.

pub mod annotations;
pub mod frames;
pub mod health;
pub mod videos;
