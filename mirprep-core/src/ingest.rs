use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// One raw TargetScan context-score prediction, one transcript site per row.
///
/// Header names follow `Predicted_Targets_Context_Scores.default_predictions.txt`;
/// fields carry the pipeline's canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Gene ID")]
    pub ensembl_gene_id: String,
    #[serde(rename = "Gene Symbol")]
    pub symbol: String,
    #[serde(rename = "Transcript ID")]
    pub ensembl_transcript: String,
    #[serde(rename = "Gene Tax ID")]
    pub taxid: String,
    #[serde(rename = "miRNA")]
    pub mirbase_id: String,
    #[serde(rename = "Site Type")]
    pub site_type: String,
    #[serde(rename = "UTR_start")]
    pub utr_start: String,
    #[serde(rename = "UTR_end")]
    pub utr_end: String,
    #[serde(rename = "context++ score")]
    pub context_score: String,
    #[serde(rename = "context++ score percentile")]
    pub context_score_percentile: String,
    #[serde(rename = "weighted context++ score")]
    pub weighted_context_score: f64,
    #[serde(rename = "weighted context++ score percentile")]
    pub weighted_context_score_percentile: String,
}

impl PredictionRecord {
    pub fn parse_from<R: Read>(reader: R) -> Result<Vec<PredictionRecord>> {
        read_table(reader)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<PredictionRecord>> {
        read_table_from_path(path)
    }
}

/// Reads a tab-separated table with a header row into typed records.
/// Columns the record type does not name are ignored.
pub(crate) fn read_table<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in csv_reader.deserialize() {
        records.push(record?);
    }

    Ok(records)
}

pub(crate) fn read_table_from_path<P, T>(path: P) -> Result<Vec<T>>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let file = File::open(path.as_ref()).map_err(|e| PrepError::io(path.as_ref(), e))?;
    read_table(BufReader::new(file))
}
