//! Service integrations for external APIs and clients.
//!
//! This module contains the services used by the incident toolkit:
//! - Incident backends (a stub standing in for PagerDuty or similar)
//! - Chat models (OpenAI and Azure OpenAI)
//!
//! Each service module defines both a generic trait and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod incident;
pub mod llm;
