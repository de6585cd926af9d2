// Library exports for the pose-form CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod source;
