use log::{debug, info, warn};

use ranked_pairs::builder::Builder;
use ranked_pairs::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
mod io_xlsx;
pub mod prompt;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Usage: tideman [candidate ...]"))]
    MissingCandidates {},
    #[snafu(display("No ballot source was provided in the configuration"))]
    MissingBallotSources {},
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Could not understand cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number or a column letter"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Invalid count at line {lineno}: {content:?}"))]
    InvalidCount { lineno: usize, content: String },

    #[snafu(display("Could not read the answer"))]
    Terminal { source: io::Error },
    #[snafu(display("The input ended before all the ballots were entered"))]
    EndOfInput {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary { source: io::Error, path: String },

    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },
    #[snafu(display("Ballot {id}: {source}"))]
    InvalidBallot { id: String, source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;
// Boxed results for the readers, which carry large error variants.
pub type BTallyResult<T> = Result<T, Box<TallyError>>;

impl TallyError {
    /// The error from the voting algorithm, if this is one.
    pub fn voting_error(&self) -> Option<&VotingErrors> {
        match self {
            TallyError::Voting { source } => Some(source),
            TallyError::InvalidBallot { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A ballot, as parsed by the readers.
/// This is before checking the names against the candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

fn read_ranking_data(root_path: Option<&Path>, cfs: &FileSource) -> BTallyResult<Vec<ParsedBallot>> {
    let p: PathBuf = match root_path {
        Some(root) => root.join(&cfs.file_path),
        None => PathBuf::from(&cfs.file_path),
    };
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(p2, cfs),
        "xlsx" => io_xlsx::read_excel_file(p2, cfs),
        "json" => io_json::read_json(p2),
        x => UnknownProviderSnafu { provider: x }.fail().map_err(Box::new),
    }
}

fn add_ballots(builder: &mut Builder, ballots: &[ParsedBallot]) -> BTallyResult<()> {
    for (idx, pb) in ballots.iter().enumerate() {
        debug!("add_ballots: {:?}", pb);
        let id = pb.id.clone().unwrap_or_else(|| format!("#{}", idx + 1));
        builder
            .add_vote(&pb.choices, pb.count.unwrap_or(1))
            .context(InvalidBallotSnafu { id })?;
    }
    Ok(())
}

fn build_summary_js(settings: Option<&OutputSettings>, rv: &ElectionResult) -> JSValue {
    let c: Option<OutputConfig> = settings.map(|s| OutputConfig {
        contest: s.contest_name.clone(),
        date: s.contest_date.clone(),
        jurisdiction: s.contest_jurisdiction.clone(),
        office: s.contest_office.clone(),
    });
    let pairs: Vec<JSValue> = rv
        .pairs
        .iter()
        .map(|p| {
            json!({
                "winner": p.winner,
                "loser": p.loser,
                "margin": p.margin,
                "opposition": p.opposition,
                "locked": p.locked
            })
        })
        .collect();
    json!({
        "config": c,
        "results": {
            "winner": rv.winner,
            "ballots": rv.num_ballots,
            "candidates": rv.candidates,
            "preferences": rv.preferences,
            "pairs": pairs
        }
    })
}

fn write_summary(out: &str, summary: &JSValue) -> BTallyResult<()> {
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu)?;
    if out == "stdout" {
        println!("{}", pretty_js_stats);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js_stats).context(WritingSummarySnafu { path: out })?;
    }
    Ok(())
}

/// Compares the summary with a reference summary, and prints the differences.
fn check_summary(reference_path: &str, summary: &JSValue) -> TallyResult<()> {
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu)?;
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu)?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Runs an election described by a configuration file.
pub fn run_election_config(
    config_path: &str,
    max_candidates: Option<usize>,
) -> BTallyResult<(ElectionResult, OutputSettings)> {
    let config_p = Path::new(config_path);
    let config_str = fs::read_to_string(config_path).context(OpeningJsonSnafu { path: config_path })?;
    let config: TallyConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu)?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config.rules, max_candidates)?;

    let candidates: Vec<String> = config.candidates.iter().map(|c| c.name.clone()).collect();
    let mut builder = Builder::new(&rules)
        .context(VotingSnafu)?
        .candidates(&candidates)
        .context(VotingSnafu)?;

    if config.ballot_sources.is_empty() {
        return MissingBallotSourcesSnafu.fail().map_err(Box::new);
    }

    let root_p = config_p.parent().context(MissingParentDirSnafu)?;
    for cfs in config.ballot_sources.iter() {
        let ballots = read_ranking_data(Some(root_p), cfs)?;
        info!("Read {} ballots from {:?}", ballots.len(), cfs.file_path);
        add_ballots(&mut builder, &ballots)?;
    }

    let result = builder.tally().context(VotingSnafu)?;
    Ok((result, config.output_settings))
}

/// Runs an election with the candidates given on the command line.
/// The ballots come from the input file, or are asked for on the terminal.
pub fn run_election_args(args: &Args) -> BTallyResult<ElectionResult> {
    if args.candidates.is_empty() {
        return MissingCandidatesSnafu.fail().map_err(Box::new);
    }
    let rules = validate_rules(&TallyRules::default(), args.max_candidates)?;
    // The roster is checked before asking for any vote.
    let mut builder = Builder::new(&rules)
        .context(VotingSnafu)?
        .candidates(&args.candidates)
        .context(VotingSnafu)?;

    match &args.input {
        Some(path) => {
            let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
            let cfs = FileSource::from_input(&provider, path, args.excel_worksheet_name.clone());
            let ballots = read_ranking_data(None, &cfs)?;
            add_ballots(&mut builder, &ballots)?;
        }
        None => {
            let stdin = io::stdin();
            let num_voters = prompt::prompt_ballots(&mut builder, stdin.lock(), io::stdout())?;
            debug!("run_election_args: {} voters", num_voters);
        }
    }

    Ok(builder.tally().context(VotingSnafu)?)
}

pub fn run(args: &Args) -> BTallyResult<()> {
    let (result, settings) = match &args.config {
        Some(config_path) => {
            let (result, settings) = run_election_config(config_path, args.max_candidates)?;
            (result, Some(settings))
        }
        None => (run_election_args(args)?, None),
    };

    println!("{}", result.winner);

    let summary = build_summary_js(settings.as_ref(), &result);
    if let Some(out) = &args.out {
        write_summary(out, &summary)?;
    }
    if let Some(reference) = &args.reference {
        check_summary(reference, &summary)?;
    }
    Ok(())
}
