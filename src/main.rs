mod args;
mod tally;

use clap::Parser;
use log::{debug, LevelFilter};
use ranked_pairs::VotingErrors;

use crate::tally::TallyError;

/// The process status for a failed run.
fn exit_status(err: &TallyError) -> i32 {
    match (err, err.voting_error()) {
        (TallyError::MissingCandidates {}, _) => 1,
        (_, Some(VotingErrors::EmptyRoster)) => 1,
        (_, Some(VotingErrors::CandidateCountExceeded { .. })) => 2,
        (_, Some(VotingErrors::InvalidCandidateName { .. }))
        | (_, Some(VotingErrors::IncompleteBallot { .. }))
        | (_, Some(VotingErrors::DuplicateRanking { .. }))
        | (_, Some(VotingErrors::RankOutOfRange { .. })) => 3,
        _ => 4,
    }
}

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    debug!("args: {:?}", args);

    if let Err(e) = tally::run(&args) {
        debug!("error: {:?}", e);
        eprintln!("{}", e);
        std::process::exit(exit_status(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(exit_status(&TallyError::MissingCandidates {}), 1);
        assert_eq!(
            exit_status(&TallyError::Voting {
                source: VotingErrors::CandidateCountExceeded { count: 10, max: 9 }
            }),
            2
        );
        assert_eq!(
            exit_status(&TallyError::InvalidBallot {
                id: "b1".to_string(),
                source: VotingErrors::DuplicateRanking {
                    name: "Alice".to_string()
                }
            }),
            3
        );
        assert_eq!(
            exit_status(&TallyError::Voting {
                source: VotingErrors::ResolverInvariantViolated { sources: vec![] }
            }),
            4
        );
        assert_eq!(
            exit_status(&TallyError::Voting {
                source: VotingErrors::RankOutOfRange { rank: 3, ranks: 3 }
            }),
            3
        );
        assert_eq!(
            exit_status(&TallyError::Voting {
                source: VotingErrors::CountOverflow { count: 1 }
            }),
            4
        );
        assert_eq!(exit_status(&TallyError::EndOfInput {}), 4);
    }
}
