//! AWS adapters and command handlers for the `qabot` client.
//!
//! This crate owns runtime integration details (SSM, ECS and DynamoDB clients,
//! the async-to-blocking bridge, CLI parsing and console rendering). Domain
//! behavior lives in `qabot_core` and is reached through its store/backend
//! traits.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod render;
