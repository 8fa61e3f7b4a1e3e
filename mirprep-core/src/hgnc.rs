use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ingest::{read_table, read_table_from_path};

/// One entry of the HGNC complete set, restricted to the columns the
/// pipeline consumes. Rows from the exploded variants additionally carry
/// their join-key column (`alias_symbols_list`, `prev_symbols_list`,
/// `refseq_accession_list`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HgncRecord {
    pub symbol: String,
    #[serde(default)]
    pub entrez_id: String,
    #[serde(default)]
    pub ensembl_gene_id: String,
    #[serde(default)]
    pub refseq_accession: String,
    #[serde(default)]
    pub uniprot_ids: String,
    #[serde(default)]
    pub alias_symbols_list: String,
    #[serde(default)]
    pub prev_symbols_list: String,
    #[serde(default)]
    pub refseq_accession_list: String,
}

/// Locations of the HGNC nomenclature tables.
#[derive(Debug, Clone)]
pub struct HgncPaths {
    pub complete_set: PathBuf,
    pub by_alias: PathBuf,
    pub by_previous: PathBuf,
    pub by_refseq: PathBuf,
}

/// In-memory join index over the HGNC tables.
///
/// Lookups behave like left joins: a miss returns `None` and the caller
/// keeps its row. The first row wins when a join key repeats.
pub struct HgncIndex {
    symbols: HashMap<String, HgncRecord>,
    aliases: HashMap<String, HgncRecord>,
    previous: HashMap<String, HgncRecord>,
    refseq: HashMap<String, HgncRecord>,
}

impl HgncIndex {
    pub fn load(paths: &HgncPaths) -> Result<HgncIndex> {
        Ok(HgncIndex::from_tables(
            read_table_from_path(&paths.complete_set)?,
            read_table_from_path(&paths.by_alias)?,
            read_table_from_path(&paths.by_previous)?,
            read_table_from_path(&paths.by_refseq)?,
        ))
    }

    pub fn from_tables(
        complete_set: Vec<HgncRecord>,
        by_alias: Vec<HgncRecord>,
        by_previous: Vec<HgncRecord>,
        by_refseq: Vec<HgncRecord>,
    ) -> HgncIndex {
        HgncIndex {
            symbols: keyed_by(complete_set, |record| record.symbol.clone()),
            aliases: keyed_by(by_alias, |record| record.alias_symbols_list.clone()),
            previous: keyed_by(by_previous, |record| record.prev_symbols_list.clone()),
            refseq: keyed_by(by_refseq, |record| record.refseq_accession_list.clone()),
        }
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&HgncRecord> {
        self.symbols.get(symbol)
    }

    pub fn by_alias(&self, alias: &str) -> Option<&HgncRecord> {
        self.aliases.get(alias)
    }

    pub fn by_previous_symbol(&self, previous: &str) -> Option<&HgncRecord> {
        self.previous.get(previous)
    }

    pub fn by_refseq_accession(&self, accession: &str) -> Option<&HgncRecord> {
        self.refseq.get(accession)
    }

    /// Resolves a symbol the way the harmonization join does: current
    /// symbol first, then alias, then previous symbol.
    pub fn resolve(&self, symbol: &str) -> Option<&HgncRecord> {
        self.by_symbol(symbol)
            .or_else(|| self.by_alias(symbol))
            .or_else(|| self.by_previous_symbol(symbol))
    }
}

fn keyed_by<F>(records: Vec<HgncRecord>, key: F) -> HashMap<String, HgncRecord>
where
    F: Fn(&HgncRecord) -> String,
{
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        let join_key = key(&record);
        if join_key.is_empty() {
            continue;
        }
        map.entry(join_key).or_insert(record);
    }
    map
}

/// One row of the Biomart Ensembl-to-HGNC export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsemblXrefRecord {
    #[serde(rename = "Gene stable ID")]
    pub gene_stable_id: String,
    #[serde(rename = "Transcript stable ID", default)]
    pub transcript_stable_id: String,
    #[serde(rename = "HGNC symbol", default)]
    pub hgnc_symbol: String,
}

/// Ensembl gene id to HGNC symbol map derived from the Biomart export.
///
/// A gene with one distinct symbol maps to it directly; conflicting
/// symbols are joined with commas, matching the upstream convention.
pub struct EnsemblXref {
    by_gene_id: HashMap<String, String>,
}

impl EnsemblXref {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<EnsemblXref> {
        Ok(EnsemblXref::from_records(read_table_from_path(path)?))
    }

    pub fn parse_from<R: Read>(reader: R) -> Result<EnsemblXref> {
        Ok(EnsemblXref::from_records(read_table(reader)?))
    }

    pub fn from_records(records: Vec<EnsemblXrefRecord>) -> EnsemblXref {
        let grouped = records
            .into_iter()
            .filter(|record| !record.hgnc_symbol.trim().is_empty())
            .map(|record| (record.gene_stable_id, record.hgnc_symbol))
            .into_group_map();

        let by_gene_id = grouped
            .into_iter()
            .map(|(gene_id, symbols)| {
                let distinct: BTreeSet<String> = symbols.into_iter().collect();
                let symbol = distinct.into_iter().collect::<Vec<_>>().join(",");
                (gene_id, symbol)
            })
            .collect();

        EnsemblXref { by_gene_id }
    }

    pub fn symbol_for(&self, ensembl_gene_id: &str) -> Option<&str> {
        self.by_gene_id.get(ensembl_gene_id).map(|s| s.as_str())
    }
}

/// First non-null candidate wins, in the order given.
pub fn coalesce<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().flatten().next()
}
