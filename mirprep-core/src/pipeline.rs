use std::cmp::Ordering;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::aggregate::aggregate_pairs;
use crate::error::{PrepError, Result};
use crate::export::TsvExporter;
use crate::hgnc::{coalesce, EnsemblXref, HgncIndex, HgncPaths};
use crate::ingest::PredictionRecord;
use crate::models::Interaction;
use crate::normalize::{normalize_scores, ScoreOrientation};

/// Everything one conversion run needs: input locations, filtering and
/// normalization parameters, output location.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub predictions: PathBuf,
    pub hgnc: HgncPaths,
    /// Optional Biomart export used to fill symbols HGNC could not map.
    pub ensembl_xref: Option<PathBuf>,
    pub output: PathBuf,
    /// miRNA identifier prefix selecting the species, e.g. `hsa`.
    pub species_prefix: String,
    /// Label stamped on every output row.
    pub data_source: String,
    pub orientation: ScoreOrientation,
    /// How many of the smallest normalized scores enter the ranked product.
    pub ranked_count: usize,
}

impl PipelineConfig {
    pub const DEFAULT_SPECIES_PREFIX: &'static str = "hsa";
    pub const DEFAULT_DATA_SOURCE: &'static str = "TargetScan_v7_2";
    pub const DEFAULT_RANKED_COUNT: usize = 3;
}

/// Row counts observed at each stage. Dropped rows are silently removed
/// from the output but surfaced here for diagnostics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PipelineReport {
    pub rows_read: usize,
    pub rows_in_species: usize,
    pub rows_unmapped: usize,
    pub rows_dropped: usize,
    pub pairs_written: usize,
}

/// Runs the full conversion: read, filter to species, strip identifier
/// versions, normalize, harmonize symbols, drop incomplete rows, collapse
/// duplicate pairs, re-normalize, sort, and write the cleaned table.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    if config.ranked_count == 0 {
        return Err(PrepError::Config(
            "ranked-product count must be at least 1".to_string(),
        ));
    }

    let mut report = PipelineReport::default();

    let records = PredictionRecord::load(&config.predictions)?;
    report.rows_read = records.len();

    let mut records: Vec<PredictionRecord> = records
        .into_iter()
        .filter(|record| record.mirbase_id.starts_with(&config.species_prefix))
        .collect();
    report.rows_in_species = records.len();

    // Ensembl ids carry a ".N" version suffix nothing downstream uses.
    for record in records.iter_mut() {
        record.ensembl_gene_id = strip_version(&record.ensembl_gene_id).to_string();
        record.ensembl_transcript = strip_version(&record.ensembl_transcript).to_string();
    }

    // Normalize over the species-filtered column, before any row is
    // dropped, so the bounds reflect the whole prediction set.
    let raw_scores: Vec<f64> = records
        .iter()
        .map(|record| record.weighted_context_score)
        .collect();
    let normalized = normalize_scores(&raw_scores, config.orientation);

    let hgnc = HgncIndex::load(&config.hgnc)?;
    let xref = match &config.ensembl_xref {
        Some(path) => Some(EnsemblXref::load(path)?),
        None => None,
    };

    let mut rows: Vec<Interaction> = Vec::with_capacity(records.len());
    for (record, score_norm) in records.into_iter().zip(normalized) {
        let from_hgnc = hgnc
            .resolve(&record.symbol)
            .map(|entry| entry.symbol.as_str());
        let from_xref = xref
            .as_ref()
            .and_then(|xref| xref.symbol_for(&record.ensembl_gene_id));

        let symbol = match coalesce(vec![from_hgnc, from_xref]) {
            Some(symbol) => symbol.to_string(),
            None => {
                report.rows_unmapped += 1;
                report.rows_dropped += 1;
                debug!(symbol = %record.symbol, "no HGNC match, dropping row");
                continue;
            }
        };

        let row = Interaction {
            symbol,
            mirbase_id: record.mirbase_id,
            score: record.weighted_context_score,
            score_norm,
            data_source: config.data_source.clone(),
            // Placeholders; set to the canonical pair after aggregation.
            original_symbol: String::new(),
            original_mirbase_id: String::new(),
        };
        if is_incomplete(&row) {
            report.rows_dropped += 1;
            continue;
        }
        rows.push(row);
    }

    info!(
        rows_read = report.rows_read,
        rows_in_species = report.rows_in_species,
        rows_unmapped = report.rows_unmapped,
        rows_dropped = report.rows_dropped,
        "harmonized prediction rows"
    );

    // Collapse duplicate pairs, then bring the aggregated score column
    // back onto a [0, 1] scale.
    let mut pairs = aggregate_pairs(rows, config.ranked_count);
    let products: Vec<f64> = pairs.iter().map(|pair| pair.score_norm).collect();
    for (pair, score_norm) in pairs
        .iter_mut()
        .zip(normalize_scores(&products, config.orientation))
    {
        pair.score_norm = score_norm;
    }

    // Strongest predictions first under the configured orientation; pair
    // order breaks ties so reruns emit identical files.
    pairs.sort_by(|a, b| {
        a.score_norm
            .partial_cmp(&b.score_norm)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.pair().cmp(&b.pair()))
    });

    // Provenance now reflects the canonical symbol/id pair.
    for pair in pairs.iter_mut() {
        pair.original_symbol = pair.symbol.clone();
        pair.original_mirbase_id = pair.mirbase_id.clone();
    }
    pairs.dedup();
    report.pairs_written = pairs.len();

    let out_file =
        File::create(&config.output).map_err(|e| PrepError::io(&config.output, e))?;
    TsvExporter::new(pairs.iter())
        .write_all(BufWriter::new(out_file))
        .map_err(|e| PrepError::io(&config.output, e))?;

    info!(
        pairs = report.pairs_written,
        output = %config.output.display(),
        "wrote cleaned prediction table"
    );

    Ok(report)
}

/// Drops the ".N" version suffix from an Ensembl identifier.
fn strip_version(id: &str) -> &str {
    match id.find('.') {
        Some(index) => &id[..index],
        None => id,
    }
}

/// A row missing its symbol, miRNA id, or either score carries no signal
/// for the downstream aggregation and is removed.
fn is_incomplete(row: &Interaction) -> bool {
    row.symbol.trim().is_empty()
        || row.mirbase_id.trim().is_empty()
        || row.data_source.trim().is_empty()
        || row.score.is_nan()
        || row.score_norm.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::Path;

    const TOLERANCE: f64 = 1e-12;

    const PREDICTIONS_HEADER: &str = "Gene ID\tGene Symbol\tTranscript ID\tGene Tax ID\tmiRNA\tSite Type\tUTR_start\tUTR_end\tcontext++ score\tcontext++ score percentile\tweighted context++ score\tweighted context++ score percentile";

    fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn prediction_row(
        gene_id: &str,
        symbol: &str,
        transcript: &str,
        mirna: &str,
        weighted_score: f64,
    ) -> String {
        format!(
            "{}\t{}\t{}\t9606\t{}\t7mer-m8\t100\t107\t-0.30\t90\t{}\t95\n",
            gene_id, symbol, transcript, mirna, weighted_score
        )
    }

    fn sample_config(dir: &Path) -> PipelineConfig {
        let mut predictions = String::from(PREDICTIONS_HEADER);
        predictions.push('\n');
        // Two sites for the same pair, one aliased symbol, one symbol no
        // table maps, and one mouse miRNA.
        predictions.push_str(&prediction_row(
            "ENSG00000000001.5",
            "GENE1",
            "ENST00000000001.2",
            "hsa-miR-1",
            0.2,
        ));
        predictions.push_str(&prediction_row(
            "ENSG00000000001.5",
            "GENE1",
            "ENST00000000002.2",
            "hsa-miR-1",
            0.8,
        ));
        predictions.push_str(&prediction_row(
            "ENSG00000000002.3",
            "OLDNAME2",
            "ENST00000000003.1",
            "hsa-miR-1",
            0.5,
        ));
        predictions.push_str(&prediction_row(
            "ENSG00000000003.1",
            "NOTAGENE",
            "ENST00000000004.1",
            "hsa-miR-9",
            0.4,
        ));
        predictions.push_str(&prediction_row(
            "ENSG00000000004.1",
            "GENE1",
            "ENST00000000005.1",
            "mmu-miR-5",
            0.9,
        ));

        let complete = "hgnc_id\tsymbol\tentrez_id\tensembl_gene_id\trefseq_accession\tuniprot_ids\n\
            HGNC:1\tGENE1\t111\tENSG00000000001\tNM_0001\tP00001\n\
            HGNC:2\tGENE2\t222\tENSG00000000002\tNM_0002\tP00002\n";
        let alias = "symbol\tentrez_id\talias_symbols_list\nGENE2\t222\tOLDNAME2\n";
        let previous = "symbol\tentrez_id\tprev_symbols_list\nGENE3\t333\tANCIENT3\n";
        let refseq = "symbol\trefseq_accession_list\nGENE1\tNM_0001\n";

        PipelineConfig {
            predictions: write_fixture(dir, "predictions.txt", &predictions),
            hgnc: HgncPaths {
                complete_set: write_fixture(dir, "hgnc_complete_set.txt", complete),
                by_alias: write_fixture(dir, "hgnc_by_alias.tsv", alias),
                by_previous: write_fixture(dir, "hgnc_by_previous.tsv", previous),
                by_refseq: write_fixture(dir, "hgnc_by_refseq.tsv", refseq),
            },
            ensembl_xref: None,
            output: dir.join("targetscan.txt"),
            species_prefix: PipelineConfig::DEFAULT_SPECIES_PREFIX.to_string(),
            data_source: PipelineConfig::DEFAULT_DATA_SOURCE.to_string(),
            orientation: ScoreOrientation::Descending,
            ranked_count: PipelineConfig::DEFAULT_RANKED_COUNT,
        }
    }

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("ENSG00000139618.14"), "ENSG00000139618");
        assert_eq!(strip_version("ENSG00000139618"), "ENSG00000139618");
        assert_eq!(strip_version("a.b.c"), "a");
    }

    #[test]
    fn test_rejects_zero_ranked_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sample_config(dir.path());
        config.ranked_count = 0;
        assert!(matches!(
            run_pipeline(&config),
            Err(PrepError::Config(_))
        ));
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config(dir.path());
        let report = run_pipeline(&config).unwrap();

        assert_eq!(
            report,
            PipelineReport {
                rows_read: 5,
                rows_in_species: 4,
                rows_unmapped: 1,
                rows_dropped: 1,
                pairs_written: 2,
            }
        );

        let output = Interaction::parse_from(File::open(&config.output).unwrap()).unwrap();
        assert_eq!(output.len(), 2);

        // Raw scores in-species: [0.2, 0.8, 0.5, 0.4], so descending
        // normalization gives GENE1 the extremes 1.0 and 0.0 and the
        // aliased pair 0.5. The GENE1 ranked product collapses to 0.0,
        // and re-normalization flips the two pairs onto [0, 1].
        let gene2 = &output[0];
        assert_eq!(gene2.pair(), ("GENE2", "hsa-miR-1"));
        assert!((gene2.score - 0.5).abs() < TOLERANCE);
        assert!(gene2.score_norm.abs() < TOLERANCE);

        let gene1 = &output[1];
        assert_eq!(gene1.pair(), ("GENE1", "hsa-miR-1"));
        assert!((gene1.score - 0.5).abs() < TOLERANCE);
        assert!((gene1.score_norm - 1.0).abs() < TOLERANCE);

        for row in &output {
            assert!(!row.symbol.is_empty());
            assert!(!row.mirbase_id.is_empty());
            assert!((0.0..=1.0).contains(&row.score_norm));
            assert_eq!(row.data_source, "TargetScan_v7_2");
            // Provenance reflects the canonical pair.
            assert_eq!(row.original_symbol, row.symbol);
            assert_eq!(row.original_mirbase_id, row.mirbase_id);
        }
    }

    #[test]
    fn test_output_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config(dir.path());
        run_pipeline(&config).unwrap();

        let first = Interaction::parse_from(File::open(&config.output).unwrap()).unwrap();
        let mut buffer = Vec::new();
        TsvExporter::new(first.iter()).write_all(&mut buffer).unwrap();
        let second = Interaction::parse_from(buffer.as_slice()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensembl_xref_fills_unmapped_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sample_config(dir.path());
        // NOTAGENE's ensembl id (version already stripped by the time the
        // xref is consulted) maps to GENE9 here.
        let export = "Gene stable ID\tTranscript stable ID\tHGNC symbol\n\
            ENSG00000000003\tENST00000000004\tGENE9\n";
        config.ensembl_xref = Some(write_fixture(dir.path(), "mart_export.txt", export));

        let report = run_pipeline(&config).unwrap();
        assert_eq!(report.rows_unmapped, 0);
        assert_eq!(report.rows_dropped, 0);
        assert_eq!(report.pairs_written, 3);

        let output = Interaction::parse_from(File::open(&config.output).unwrap()).unwrap();
        assert!(output.iter().any(|row| row.symbol == "GENE9"));
    }

    #[test]
    fn test_missing_predictions_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sample_config(dir.path());
        config.predictions = dir.path().join("absent.txt");
        assert!(matches!(run_pipeline(&config), Err(PrepError::Io { .. })));
    }
}
