use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One gene-miRNA interaction in the pipeline's canonical column order.
///
/// Field order is the output file layout: canonical symbol, miRNA id,
/// median raw score, normalized ranked-product score, then provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub symbol: String,
    pub mirbase_id: String,
    pub score: f64,
    pub score_norm: f64,
    pub data_source: String,
    pub original_symbol: String,
    pub original_mirbase_id: String,
}

impl Interaction {
    pub fn pair(&self) -> (&str, &str) {
        (&self.symbol, &self.mirbase_id)
    }

    /// Reads interactions back from a headerless tab-separated table in
    /// the documented column order.
    pub fn parse_from<R: Read>(reader: R) -> Result<Vec<Interaction>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .from_reader(reader);

        let mut records = Vec::new();
        let mut row = csv::StringRecord::new();
        while csv_reader.read_record(&mut row)? {
            let record: Interaction = row.deserialize(None)?;
            records.push(record);
        }

        Ok(records)
    }
}
