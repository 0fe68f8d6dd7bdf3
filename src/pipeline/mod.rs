//! Ingestion pipeline
//!
//! This module contains the ingestion control flow:
//! - Planning which raw sheets still need cutting
//! - Dispatching jobs on a bounded worker pool
//! - Running one ingestion pass end to end

/// Bounded worker pool with ordered results
pub mod dispatcher;
/// Ingestion orchestration and the per-sheet worker
pub mod ingest;
/// Incremental job planning against store state
pub mod planner;

pub use dispatcher::{DispatchReport, JobDispatcher};
pub use ingest::{IngestSummary, Ingestor, SheetOutcome};
pub use planner::{IngestionPlan, IngestionPlanner, Job};
