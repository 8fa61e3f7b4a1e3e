#![deny(warnings)]
#![allow(dead_code)]

mod ingest;
mod models;
mod hgnc;
mod normalize;
mod aggregate;
mod pipeline;
mod export;
mod error;

pub use ingest::PredictionRecord;
pub use models::Interaction;
pub use hgnc::{coalesce, EnsemblXref, EnsemblXrefRecord, HgncIndex, HgncPaths, HgncRecord};
pub use normalize::{column_bounds, normalize_scores, normalize_scores_with, ScoreOrientation};
pub use aggregate::{aggregate_pairs, median, ranked_product};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineReport};
pub use export::TsvExporter;
pub use error::{PrepError, Result};
