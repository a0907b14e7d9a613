//! # Managed
//!
//! A runtime for managed resources: records that declare the desired state
//! of something living in an external system.
//!
//! This crate provides the core abstractions for observing the external
//! resource, deciding whether it is missing, stale or in sync, and driving
//! it toward the desired state.
//!
//! ## Core Concepts
//!
//! - **ManagedRecord**: The declared resource (kind, name, desired parameters,
//!   annotations, last observation, conditions)
//! - **ExternalName**: The external system's identity for the resource, bound
//!   once at creation through an annotation
//! - **ExternalClient**: Observe / create / update / delete against the
//!   external system for one kind of record
//! - **Connector**: Produces an `ExternalClient` for a record
//! - **Reconciler**: Runs the observe → create/update/delete state machine,
//!   with retry for transient failures and parallel batches
//!
//! ## Example
//!
//! ```ignore
//! use managed::{
//!     Connector, ExternalClient, ExternalName, ExternalObservation, ManagedRecord,
//!     ReconcileOptions, Reconciler, Result,
//! };
//!
//! struct Buckets;
//!
//! impl ExternalClient for Buckets {
//!     fn observe(&self, mg: &mut ManagedRecord) -> Result<ExternalObservation> {
//!         Ok(ExternalObservation::missing())
//!     }
//!     fn create(&self, mg: &mut ManagedRecord) -> Result<()> {
//!         mg.set_external_name(ExternalName::new("bucket-1"));
//!         Ok(())
//!     }
//!     fn update(&self, _mg: &ManagedRecord) -> Result<()> { Ok(()) }
//!     fn delete(&self, _mg: &ManagedRecord) -> Result<()> { Ok(()) }
//! }
//!
//! let reconciler = Reconciler::new(my_connector, ReconcileOptions::default());
//! let outcome = reconciler.reconcile(&mut record)?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`Connector`]: Resolves configuration and builds clients
//! - [`ExternalClient`]: Talks to the external system
//! - [`ProgressCallback`]: Receives progress updates during batches
//! - [`RetryCallback`]: Notified before each retry
//!
//! Nothing here knows about terminals, config files or HTTP.

pub mod error;
pub mod external;
pub mod progress;
pub mod reconciler;
pub mod record;
pub mod retry;
pub mod types;

// Re-export main types at crate root
pub use error::{BoxError, Error, ErrorCategory, Result};
pub use external::{Connector, ExternalClient, ExternalObservation, check_kind};
pub use progress::{NoProgress, ProgressCallback};
pub use reconciler::{ReconcileReport, Reconciler};
pub use record::{EXTERNAL_NAME_ANNOTATION, ExternalName, ManagedRecord};
pub use retry::{LogRetry, NoRetryCallback, RetryCallback, RetryConfig, with_retry};
pub use types::{
    Conditions, ReadyReason, ReconcileAction, ReconcileOptions, ReconcileOutcome, ReconcileState,
    ReconcileSummary, SyncStatus,
};
