// ABOUTME: Library exports for the change case CLI modules
// ABOUTME: Makes internal modules available to integration tests

pub mod cli;
pub mod commands;
pub mod config;
pub mod progress;
