//! PIDS Alarm Pipeline
//!
//! Ingestion, normalization, and compliance analytics for
//! pipeline-intrusion-detection alarm logs: tabular exports with metadata
//! preambles, inconsistent column naming, locale-specific date formats,
//! and mixed encodings.
//!
//! # Features
//!
//! - **Tolerant Ingestion**: delimited and paged-spreadsheet documents,
//!   adaptive header-row location with a fixed-offset mode for known
//!   export formats
//! - **Auditable Normalization**: one explicit dialect map from canonical
//!   field names to accepted raw labels, resolved once per document
//! - **Typed Rejection**: a document either fully validates past the
//!   schema gate or contributes zero events; parse faults never escape as
//!   raw errors
//! - **Durable History**: documents persist to a flat object store keyed
//!   by filename, with per-object failure isolation on corpus rebuild and
//!   a TTL-bounded cache invalidated on every write
//! - **Compliance Analytics**: daily, section-hotspot, stretch, and
//!   hourly rollups plus the corpus-wide SOP compliance rate, all pure
//!   functions of the event table
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │   Header   │──▶│   Schema   │──▶│   Field    │──▶│Event Table │
//! │   Locator  │   │ Normalizer │   │  Coercer   │   │  Builder   │
//! └────────────┘   └────────────┘   └────────────┘   └─────┬──────┘
//!                                                          ▼
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │Aggregation │◀──│   Corpus   │◀──│   Corpus   │◀──│   Object   │
//! │   Engine   │   │    Cache   │   │   Rebuild  │   │    Store   │
//! └────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pids_alarm_pipeline::{
//!     analytics,
//!     config::PipelineConfig,
//!     models::RawDocument,
//!     pipeline::AlarmPipeline,
//!     storage::MemoryStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pids_alarm_pipeline::error::PipelineError> {
//!     let config = PipelineConfig::default();
//!     let mut pipeline = AlarmPipeline::new(MemoryStore::new(), &config).await?;
//!
//!     let bytes = std::fs::read("05-02-2026-ALARMS.csv")?;
//!     pipeline
//!         .upload(RawDocument::new("05-02-2026-ALARMS.csv", bytes))
//!         .await?;
//!
//!     let corpus = pipeline.corpus().await?;
//!     for day in analytics::daily_rollup(&corpus) {
//!         println!("{}: {} alarms", day.date, day.total_alarms);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`header`] - Header-row location within noisy preambles
//! - [`schema`] - Column dialect map and the schema gate
//! - [`transformation`] - Field coercion and derived compliance flags
//! - [`ingestion`] - Per-document event table builder
//! - [`analytics`] - Rollups and vulnerability scoring
//! - [`storage`] - Object store boundary (in-memory and S3 backends)
//! - [`corpus`] - Historical corpus reconstruction
//! - [`cache`] - TTL-bounded corpus cache
//! - [`pipeline`] - Upload/analytics facade
//! - [`config`] - Configuration management and validation
//! - [`models`] - Documents, cells, events, tables
//! - [`error`] - Error handling and reporting

pub mod analytics;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod header;
pub mod ingestion;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod storage;
pub mod transformation;

pub use analytics::{DailyRollup, HourlyRollup, SectionRollup, StretchRollup};
pub use error::{PipelineError, Result};
pub use ingestion::{IngestOptions, IngestOutcome, RejectReason};
pub use models::{AlarmEvent, EventTable, RawDocument};
pub use pipeline::{AlarmPipeline, UploadOutcome};
pub use storage::{MemoryStore, ObjectStore, StoredObject};

/// Crate version, from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
