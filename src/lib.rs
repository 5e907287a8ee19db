//! Library root for `incident-toolkit`.
//!
//! Glue for an LLM-powered DevOps assistant:
//! - An incident toolkit (read, clean, escalate) exposed as chat-completion tools
//! - A factory that builds an OpenAI or Azure OpenAI chat model from `.env` configuration
//!
//! The two halves are independent; the binary composes them through the
//! `assistant` module. Services are built around traits so the incident backend
//! and the chat model can be swapped or mocked.

pub mod base;
pub mod assistant;
pub mod factory;
pub mod prelude;
pub mod service;
pub mod toolkit;
