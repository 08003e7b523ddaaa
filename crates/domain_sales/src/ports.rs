//! Sales Pipeline Ports
//!
//! The pipeline never stores anything itself. [`SalesProcessPort`] is what it
//! needs from the persistence collaborator (the hosted backend's tables):
//! reading records, versioned writes, and the one-way import conversion.
//!
//! # Guarantees expected from adapters
//!
//! - `save_process` is a compare-and-set on `version`: the write only lands
//!   if the stored record still has `expected_version`, otherwise
//!   `PortError::Conflict`.
//! - `commit_import` is atomic and unique per process: it creates the policy
//!   and links it to the process in one step. A process that is already
//!   linked fails with `PortError::AlreadyExists` naming the existing policy;
//!   a stale token version fails with `PortError::Conflict`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_sales::{SalesPipelineService, PipelineConfig};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn SalesProcessPort> = Arc::new(BackendSalesAdapter::new(client));
//! let service = SalesPipelineService::new(port, PipelineConfig::from_env()?);
//! ```

use async_trait::async_trait;

use core_kernel::{
    DomainPort, HealthCheckable, OperationMetadata, PolicyId, PortError, SalesProcessId,
};

use crate::import::{ImportToken, PolicyDraft};
use crate::process::SalesProcess;
use crate::quote::Quote;

/// Persistence operations required by the sales pipeline
#[async_trait]
pub trait SalesProcessPort: DomainPort + HealthCheckable {
    /// Retrieves the latest stored revision of a process
    async fn get_process(
        &self,
        id: SalesProcessId,
        metadata: Option<OperationMetadata>,
    ) -> Result<SalesProcess, PortError>;

    /// Lists all processes visible to the caller
    async fn list_processes(
        &self,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<SalesProcess>, PortError>;

    /// Stores a newly opened process
    async fn insert_process(
        &self,
        process: &SalesProcess,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Replaces the stored process if its version still equals `expected_version`
    async fn save_process(
        &self,
        process: &SalesProcess,
        expected_version: u64,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Quotes attached to a process
    async fn quotes_for_process(
        &self,
        id: SalesProcessId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Quote>, PortError>;

    /// Creates the policy and links it to the process, at most once per process
    async fn commit_import(
        &self,
        token: &ImportToken,
        draft: &PolicyDraft,
        metadata: Option<OperationMetadata>,
    ) -> Result<PolicyId, PortError>;
}

/// In-memory adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use chrono::Utc;
    use tokio::sync::RwLock;
    use tracing::debug;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::import::is_ready_for_import;

    /// In-memory implementation of SalesProcessPort
    ///
    /// Enforces the same compare-and-set and import uniqueness rules a real
    /// backend adapter must.
    #[derive(Debug, Default)]
    pub struct MockSalesProcessPort {
        processes: Arc<RwLock<HashMap<SalesProcessId, SalesProcess>>>,
        quotes: Arc<RwLock<HashMap<SalesProcessId, Vec<Quote>>>>,
        policies: Arc<RwLock<HashMap<PolicyId, PolicyDraft>>>,
    }

    impl MockSalesProcessPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with processes for testing
        pub async fn with_processes(processes: Vec<SalesProcess>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.processes.write().await;
                for process in processes {
                    stored.insert(process.id, process);
                }
            }
            port
        }

        pub async fn add_quote(&self, quote: Quote) {
            self.quotes
                .write()
                .await
                .entry(quote.process_id)
                .or_default()
                .push(quote);
        }

        /// Overwrites a stored process without a version check, simulating
        /// a write from another client
        pub async fn force_store(&self, process: SalesProcess) {
            self.processes.write().await.insert(process.id, process);
        }

        pub async fn policy_count(&self) -> usize {
            self.policies.read().await.len()
        }

        pub async fn policy(&self, id: PolicyId) -> Option<PolicyDraft> {
            self.policies.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockSalesProcessPort {}

    #[async_trait]
    impl HealthCheckable for MockSalesProcessPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-sales-process-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl SalesProcessPort for MockSalesProcessPort {
        async fn get_process(
            &self,
            id: SalesProcessId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<SalesProcess, PortError> {
            self.processes
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("SalesProcess", id))
        }

        async fn list_processes(
            &self,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<SalesProcess>, PortError> {
            let mut processes: Vec<_> = self.processes.read().await.values().cloned().collect();
            processes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(processes)
        }

        async fn insert_process(
            &self,
            process: &SalesProcess,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut processes = self.processes.write().await;
            if processes.contains_key(&process.id) {
                return Err(PortError::conflict(format!("{} already exists", process.id)));
            }
            debug!(process_id = %process.id, "Inserting sales process");
            processes.insert(process.id, process.clone());
            Ok(())
        }

        async fn save_process(
            &self,
            process: &SalesProcess,
            expected_version: u64,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut processes = self.processes.write().await;
            let stored = processes
                .get_mut(&process.id)
                .ok_or_else(|| PortError::not_found("SalesProcess", process.id))?;

            if stored.version != expected_version {
                return Err(PortError::conflict(format!(
                    "{} is at version {}, expected {}",
                    process.id, stored.version, expected_version
                )));
            }
            debug!(process_id = %process.id, version = process.version, "Saving sales process");
            *stored = process.clone();
            Ok(())
        }

        async fn quotes_for_process(
            &self,
            id: SalesProcessId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Quote>, PortError> {
            Ok(self.quotes.read().await.get(&id).cloned().unwrap_or_default())
        }

        async fn commit_import(
            &self,
            token: &ImportToken,
            draft: &PolicyDraft,
            _metadata: Option<OperationMetadata>,
        ) -> Result<PolicyId, PortError> {
            // Both maps stay locked for the whole conversion
            let mut processes = self.processes.write().await;
            let mut policies = self.policies.write().await;

            let stored = processes
                .get_mut(&token.process_id())
                .ok_or_else(|| PortError::not_found("SalesProcess", token.process_id()))?;

            if let Some(existing) = stored.linked_policy_id {
                return Err(PortError::already_exists("Policy", existing));
            }
            if stored.version != token.process_version() {
                return Err(PortError::conflict(format!(
                    "{} changed since the import was requested",
                    stored.id
                )));
            }
            if !is_ready_for_import(stored) {
                return Err(PortError::validation("sales process is not ready for import"));
            }

            let policy_id = PolicyId::new_v7();
            policies.insert(policy_id, draft.clone());
            stored.linked_policy_id = Some(policy_id);
            stored.touch(Utc::now());
            debug!(process_id = %stored.id, %policy_id, "Imported sales process");
            Ok(policy_id)
        }
    }
}
