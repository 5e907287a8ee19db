//! Stub incident backend that serves a single canned incident.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::{
    incident::Incident,
    types::{Res, Void},
};

use super::{GenericIncidentBackend, IncidentBackend};

// Extra methods on `IncidentBackend` applied by the stub implementation.

impl IncidentBackend {
    /// Creates the stub incident backend.
    pub fn stub() -> Self {
        Self { inner: Arc::new(StubIncidentBackend) }
    }
}

/// The incident every stub lookup returns.
pub fn canned_incident() -> Incident {
    Incident::new(
        "INC-123",
        "Server Outage",
        "The main application server went down, causing a service disruption.",
        "high",
        "open",
    )
}

// Structs.

/// Stub backend.
///
/// Lookups ignore the requested identifier and always succeed with [`canned_incident`];
/// escalation has no side effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubIncidentBackend;

#[async_trait]
impl GenericIncidentBackend for StubIncidentBackend {
    #[instrument(name = "StubIncidentBackend::lookup", skip_all)]
    async fn lookup(&self, incident_id: &str) -> Res<Incident> {
        info!("Stub lookup for `{incident_id}`; returning the canned incident.");
        Ok(canned_incident())
    }

    #[instrument(name = "StubIncidentBackend::escalate", skip_all)]
    async fn escalate(&self, incident: &Incident) -> Void {
        // Bound outside the log macro, which skips its arguments when disabled.
        let id = incident.id()?;

        info!("Stub escalation for `{id}`; nobody was paged.");
        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::IncidentError;

    #[tokio::test]
    async fn test_stub_lookup_ignores_identifier() {
        let backend = IncidentBackend::stub();

        let incident = backend.lookup("INC-999").await.unwrap();

        assert_eq!(incident.id().unwrap(), "INC-123");
        assert_eq!(incident, canned_incident());
    }

    #[tokio::test]
    async fn test_stub_escalate_requires_id() {
        let backend = IncidentBackend::stub();
        let mut incident = canned_incident();
        incident.remove("id");

        assert!(backend.escalate(&incident).await.is_err());
    }

    #[tokio::test]
    async fn test_stub_escalate_rejects_missing_id_without_subscriber() {
        let mut incident = canned_incident();
        incident.remove("id");

        // No subscriber is installed here, so `info!` events are disabled.
        let err = StubIncidentBackend.escalate(&incident).await.unwrap_err();

        assert_eq!(err.downcast_ref::<IncidentError>(), Some(&IncidentError::MissingField("id".to_string())));
    }
}
