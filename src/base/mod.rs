//! Core components, types, and utilities for the incident toolkit.
//!
//! This module contains fundamental building blocks used throughout the crate:
//! - Configuration file location and resolved model settings.
//! - The incident record.
//! - System prompts for the assistant.
//! - Common types, errors, and result handling.

pub mod config;
pub mod incident;
pub mod prompts;
pub mod types;
