use std::convert::TryFrom;
use std::path::PathBuf;

use anyhow::Context;
use clap::{App, Arg, ArgMatches};
use mirprep::{run_pipeline, HgncPaths, PipelineConfig, ScoreOrientation};
use tracing_subscriber::EnvFilter;

fn app<'a, 'b>() -> clap::App<'a, 'b> {
    App::new("mirprep")
        .about("Cleans a TargetScan prediction file into one scored row per gene-miRNA pair")
        .arg(Arg::with_name("predictions")
            .long("--predictions")
            .required(true)
            .takes_value(true)
            .help("TargetScan context-score prediction file"))
        .arg(Arg::with_name("hgnc")
            .long("--hgnc")
            .required(true)
            .takes_value(true)
            .help("HGNC complete set"))
        .arg(Arg::with_name("hgnc_alias")
            .long("--hgnc-alias")
            .required(true)
            .takes_value(true)
            .help("HGNC complete set exploded by alias symbol"))
        .arg(Arg::with_name("hgnc_prev")
            .long("--hgnc-prev")
            .required(true)
            .takes_value(true)
            .help("HGNC complete set exploded by previous symbol"))
        .arg(Arg::with_name("hgnc_refseq")
            .long("--hgnc-refseq")
            .required(true)
            .takes_value(true)
            .help("HGNC complete set exploded by RefSeq accession"))
        .arg(Arg::with_name("ensembl_xref")
            .long("--ensembl-xref")
            .takes_value(true)
            .help("Biomart Ensembl-to-HGNC export used to fill unmapped symbols"))
        .arg(Arg::with_name("output")
            .long("--output")
            .short("o")
            .required(true)
            .takes_value(true))
        .arg(Arg::with_name("species")
            .long("--species")
            .takes_value(true)
            .default_value("hsa")
            .help("miRNA identifier prefix to keep"))
        .arg(Arg::with_name("orientation")
            .long("--orientation")
            .possible_values(&["asc", "desc"])
            .default_value("desc")
            .takes_value(true)
            .help("Whether larger raw scores mean stronger predictions"))
        .arg(Arg::with_name("top")
            .long("--top")
            .takes_value(true)
            .default_value("3")
            .help("Number of smallest normalized scores in the ranked product"))
        .arg(Arg::with_name("source")
            .long("--source")
            .takes_value(true)
            .default_value("TargetScan_v7_2")
            .help("Data source label stamped on every output row"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = app().get_matches();
    match run(&matches) {
        Ok(()) => (),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let orientation = args.value_of("orientation").expect("should have orientation arg");
    let orientation = ScoreOrientation::try_from(orientation)?;

    let ranked_count: usize = args.value_of("top").expect("should have top arg")
        .parse()
        .context("--top must be a positive integer")?;

    let config = PipelineConfig {
        predictions: path_arg(args, "predictions"),
        hgnc: HgncPaths {
            complete_set: path_arg(args, "hgnc"),
            by_alias: path_arg(args, "hgnc_alias"),
            by_previous: path_arg(args, "hgnc_prev"),
            by_refseq: path_arg(args, "hgnc_refseq"),
        },
        ensembl_xref: args.value_of("ensembl_xref").map(PathBuf::from),
        output: path_arg(args, "output"),
        species_prefix: args.value_of("species").expect("should have species arg").to_string(),
        data_source: args.value_of("source").expect("should have source arg").to_string(),
        orientation,
        ranked_count,
    };

    let report = run_pipeline(&config)?;
    println!(
        "{} rows in, {} pairs out ({} dropped, {} of those unmapped)",
        report.rows_read, report.pairs_written, report.rows_dropped, report.rows_unmapped
    );

    Ok(())
}

fn path_arg(args: &ArgMatches, name: &str) -> PathBuf {
    PathBuf::from(args.value_of(name).expect("required arg should be present"))
}
