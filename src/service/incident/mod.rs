//! Incident-management backend integration.
//!
//! The toolkit never talks to an incident system directly; it goes through the
//! `GenericIncidentBackend` trait so a real backend (PagerDuty or similar) can be
//! swapped in for the stub.

pub mod stub;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    incident::Incident,
    types::{Res, Void},
};

// Traits.

/// Generic incident backend trait that backends must implement.
#[async_trait]
pub trait GenericIncidentBackend: Send + Sync + 'static {
    /// Look up an incident by its identifier.
    ///
    /// Fails with [`crate::base::types::IncidentError::NotFound`] when no incident matches.
    async fn lookup(&self, incident_id: &str) -> Res<Incident>;

    /// Escalate an incident, e.g. by paging the responsible on-call.
    async fn escalate(&self, incident: &Incident) -> Void;
}

// Structs.

/// Incident backend for the toolkit.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct IncidentBackend {
    inner: Arc<dyn GenericIncidentBackend>,
}

impl Deref for IncidentBackend {
    type Target = dyn GenericIncidentBackend;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl IncidentBackend {
    pub fn new(inner: Arc<dyn GenericIncidentBackend>) -> Self {
        Self { inner }
    }
}
