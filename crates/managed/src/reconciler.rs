//! Reconciliation engine - drives records toward their desired state

use crate::error::{Error, Result};
use crate::external::{Connector, ExternalClient, check_kind};
use crate::progress::ProgressCallback;
use crate::record::ManagedRecord;
use crate::retry::{LogRetry, with_retry};
use crate::types::{
    ReadyReason, ReconcileAction, ReconcileOptions, ReconcileOutcome, ReconcileState,
    ReconcileSummary, SyncStatus,
};
use rayon::prelude::*;

/// Result for one record of a batch
#[derive(Debug)]
pub struct ReconcileReport {
    pub name: String,
    pub result: Result<ReconcileOutcome>,
}

/// Drives managed records of one kind
///
/// # Type Parameters
/// * `C` - Connector for the record kind
pub struct Reconciler<C> {
    connector: C,
    options: ReconcileOptions,
}

impl<C: Connector> Reconciler<C> {
    pub fn new(connector: C, options: ReconcileOptions) -> Self {
        Self { connector, options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Reconcile one record
    ///
    /// Updates the record's binding, observation and conditions in place.
    /// The Synced condition reflects the returned result. Observe, update and
    /// delete are retried per the retry policy; create is attempted once.
    pub fn reconcile(&self, mg: &mut ManagedRecord) -> Result<ReconcileOutcome> {
        let result = self.reconcile_record(mg);
        mg.conditions.synced = Some(match &result {
            Ok(_) => SyncStatus::Success,
            Err(e) => SyncStatus::Error {
                message: e.to_string(),
            },
        });
        if let Err(e) = &result {
            log::error!("{}: {}", mg.name, e);
        }
        result
    }

    fn reconcile_record(&self, mg: &mut ManagedRecord) -> Result<ReconcileOutcome> {
        check_kind(mg, self.connector.kind())?;
        let client = self.connector.connect(mg)?;

        if mg.deletion_requested {
            return self.delete(client.as_ref(), mg);
        }

        let bound = mg.is_bound();
        let name = mg.name.clone();
        let retry = LogRetry { name: &name };
        let observation = with_retry(&self.options.retry, Some(&retry), || client.observe(mg))?;
        let state = ReconcileState::from_observation(bound, &observation);
        log::info!("{}: {}", mg.name, state);

        let action = match state {
            ReconcileState::NoIdentity | ReconcileState::Absent => {
                if self.options.dry_run {
                    mg.conditions.ready = Some(ReadyReason::Unavailable);
                    ReconcileAction::Skipped {
                        reason: "would create".to_string(),
                    }
                } else {
                    // At most once per cycle; failures surface to the caller
                    client.create(mg)?;
                    let external_name = mg.external_name().ok_or_else(|| {
                        Error::MalformedResource(format!(
                            "create of '{}' did not bind an external name",
                            mg.name
                        ))
                    })?;
                    log::info!("{}: created {}", mg.name, external_name);
                    mg.conditions.ready = Some(ReadyReason::Creating);
                    ReconcileAction::Created { external_name }
                }
            }
            ReconcileState::Stale => {
                mg.conditions.ready = Some(ReadyReason::Available);
                if self.options.dry_run {
                    ReconcileAction::Skipped {
                        reason: "would update".to_string(),
                    }
                } else {
                    with_retry(&self.options.retry, Some(&retry), || client.update(mg))?;
                    log::info!("{}: updated", mg.name);
                    ReconcileAction::Updated
                }
            }
            ReconcileState::UpToDate => {
                mg.conditions.ready = Some(ReadyReason::Available);
                ReconcileAction::NoChange
            }
        };

        Ok(ReconcileOutcome {
            name: mg.name.clone(),
            state: Some(state),
            action,
        })
    }

    fn delete(&self, client: &dyn ExternalClient, mg: &mut ManagedRecord) -> Result<ReconcileOutcome> {
        mg.conditions.ready = Some(ReadyReason::Deleting);

        let action = if !mg.is_bound() {
            log::info!("{}: nothing bound, nothing to delete", mg.name);
            ReconcileAction::NoChange
        } else if self.options.dry_run {
            ReconcileAction::Skipped {
                reason: "would delete".to_string(),
            }
        } else {
            let retry = LogRetry { name: &mg.name };
            with_retry(&self.options.retry, Some(&retry), || client.delete(mg))?;
            log::info!("{}: deleted", mg.name);
            ReconcileAction::Deleted
        };

        Ok(ReconcileOutcome {
            name: mg.name.clone(),
            state: None,
            action,
        })
    }

    /// Reconcile many records on a pool of `jobs` threads
    ///
    /// Reports come back in input order. A failing record does not stop the
    /// others.
    pub fn reconcile_all<P: ProgressCallback>(
        &self,
        records: &mut [ManagedRecord],
        progress: &P,
    ) -> Result<(Vec<ReconcileReport>, ReconcileSummary)> {
        progress.on_batch_start(records.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs.max(1))
            .build()
            .map_err(|e| Error::Connect(format!("failed to create thread pool: {e}")))?;

        let reports: Vec<ReconcileReport> = pool.install(|| {
            records
                .par_iter_mut()
                .map(|mg| {
                    progress.on_record_start(&mg.name);
                    let result = self.reconcile(mg);
                    progress.on_record_complete(&mg.name, &result);
                    ReconcileReport {
                        name: mg.name.clone(),
                        result,
                    }
                })
                .collect()
        });

        let mut summary = ReconcileSummary::default();
        for report in &reports {
            summary.add_result(&report.result);
        }
        progress.on_batch_complete();

        Ok((reports, summary))
    }
}
