use crate::core::Pipeline;
use crate::domain::model::{EndpointOutcome, EndpointReport, EndpointStage, RunSummary};
use crate::utils::error::EtlError;
use tracing::Instrument;

/// Runs the pipeline over every endpoint, one at a time.
///
/// A failing endpoint is logged and skipped; only an unreachable database
/// stops the remaining endpoints.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

struct StageFailure {
    stage: EndpointStage,
    error: EtlError,
    /// Documents already loaded before the failing stage.
    inserted: usize,
}

fn at(stage: EndpointStage, inserted: usize) -> impl FnOnce(EtlError) -> StageFailure {
    move |error| StageFailure {
        stage,
        error,
        inserted,
    }
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self, endpoints: &[String]) -> RunSummary {
        tracing::info!("🚀 Starting ETL run over {} endpoint(s)", endpoints.len());
        let mut summary = RunSummary::default();

        for (index, endpoint) in endpoints.iter().enumerate() {
            let span = tracing::info_span!("endpoint", endpoint = %endpoint);
            let result = self.process(endpoint).instrument(span).await;

            match result {
                Ok(outcome) => {
                    if let EndpointOutcome::Done { inserted, .. } = &outcome {
                        summary.total_inserted += inserted;
                    }
                    summary.endpoints.push(EndpointReport {
                        endpoint: endpoint.clone(),
                        outcome,
                    });
                }
                Err(StageFailure {
                    stage,
                    error,
                    inserted,
                }) => {
                    summary.total_inserted += inserted;
                    tracing::error!(
                        "❌ Failed processing endpoint '{}' while {}: {} (Category: {:?}, Severity: {:?})",
                        endpoint,
                        stage,
                        error,
                        error.category(),
                        error.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());

                    let abort = error.aborts_run();
                    summary.endpoints.push(EndpointReport {
                        endpoint: endpoint.clone(),
                        outcome: EndpointOutcome::Failed {
                            stage,
                            error: error.to_string(),
                            inserted,
                        },
                    });

                    if abort {
                        let skipped = endpoints.len() - index - 1;
                        tracing::error!(
                            "Aborting run: database unavailable, {} endpoint(s) not processed",
                            skipped
                        );
                        summary.aborted = true;
                        break;
                    }
                }
            }
        }

        tracing::info!(
            "Done. Total inserted: {} ({} succeeded, {} failed)",
            summary.total_inserted,
            summary.succeeded(),
            summary.failed()
        );
        summary
    }

    async fn process(&self, endpoint: &str) -> Result<EndpointOutcome, StageFailure> {
        let fetched = self
            .pipeline
            .extract(endpoint)
            .await
            .map_err(at(EndpointStage::Extracting, 0))?;
        tracing::info!("Fetched {} records from {}", fetched.record_count, fetched.url);

        let documents = self
            .pipeline
            .transform(&fetched.records, endpoint)
            .await
            .map_err(at(EndpointStage::Transforming, 0))?;

        let inserted = self
            .pipeline
            .load(&documents)
            .await
            .map_err(at(EndpointStage::Loading, 0))?;

        let debug_file = self
            .pipeline
            .write_debug(endpoint, &documents)
            .await
            .map_err(at(EndpointStage::Debugging, inserted))?;
        tracing::info!("Wrote {}", debug_file);

        Ok(EndpointOutcome::Done {
            fetched: fetched.record_count,
            inserted,
            debug_file,
        })
    }
}
