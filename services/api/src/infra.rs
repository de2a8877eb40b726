use chrono::NaiveDate;
use credit_core::config::IngestConfig;
use credit_core::error::AppError;
use credit_core::ingest::{ImportSummary, LedgerImporter};
use credit_core::lending::{InMemoryLedger, LendingService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type LedgerService = LendingService<InMemoryLedger, InMemoryLedger, InMemoryLedger>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One in-memory ledger backing all three stores.
pub(crate) fn build_service(today: Option<NaiveDate>) -> (Arc<LedgerService>, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::default());
    let service = LendingService::new(ledger.clone(), ledger.clone(), ledger.clone());
    let service = match today {
        Some(today) => service.with_reference_date(today),
        None => service,
    };
    (Arc::new(service), ledger)
}

/// Load the configured seed exports, if any, into `ledger`.
///
/// Rejected rows and warnings are logged individually; neither stops the server.
pub(crate) fn seed_ledger(
    ingest: &IngestConfig,
    ledger: &InMemoryLedger,
    today: NaiveDate,
) -> Result<Option<ImportSummary>, AppError> {
    let Some((customers, loans)) = ingest.seed_files() else {
        return Ok(None);
    };

    let summary = LedgerImporter::new(today).import_paths(customers, loans, ledger, ledger)?;
    info!(
        customers = %customers.display(),
        loans = %loans.display(),
        %summary,
        "ledger seeded"
    );
    for row in &summary.errors {
        warn!(%row, "seed row rejected");
    }
    for row in &summary.warnings {
        warn!(%row, "seed row accepted with warning");
    }
    Ok(Some(summary))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
