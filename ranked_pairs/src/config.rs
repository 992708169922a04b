// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A ranking submitted by a voter, from the most preferred candidate to the
/// least preferred one.
///
/// Every candidate of the election must appear exactly once. The count allows
/// to submit a number of identical ballots at once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
    pub count: u64,
}

// ******** Output data structures *********

/// A majority pair, as processed by the locking procedure.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairStats {
    pub winner: String,
    pub loser: String,
    /// The number of ballots ranking the winner above the loser.
    /// This is the key used to rank the pairs.
    pub margin: u64,
    /// The number of ballots ranking the loser above the winner.
    pub opposition: u64,
    /// False if locking this pair would have closed a cycle.
    pub locked: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub winner: String,
    /// The candidates, in roster order.
    pub candidates: Vec<String>,
    /// preferences[i][j] is the number of ballots ranking candidate i above candidate j.
    pub preferences: Vec<Vec<u64>>,
    /// The majority pairs, in the order in which they were considered for locking.
    pub pairs: Vec<PairStats>,
    pub num_ballots: u64,
}

/// Errors that prevent the algorithm from completing successfully.
///
/// None of them can be recovered from within the same election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// No candidate was provided.
    EmptyRoster,
    /// More candidates than the rules allow.
    CandidateCountExceeded { count: usize, max: usize },
    /// The same name appears twice in the list of candidates.
    DuplicateCandidate { name: String },
    /// A ballot refers to a name that is not a candidate. The rank starts at 0.
    InvalidCandidateName { name: String, rank: usize },
    /// A ballot does not rank all the candidates.
    IncompleteBallot { expected: usize, found: usize },
    /// A ballot ranks the same candidate more than once.
    DuplicateRanking { name: String },
    /// A rank (starting at 0) past the last one of the ballot.
    RankOutOfRange { rank: usize, ranks: usize },
    /// Adding the ballot would overflow the vote counters. Nothing was counted.
    CountOverflow { count: u64 },
    /// The ballot was recorded against the candidates of another election.
    ForeignBallot,
    /// The locked graph does not have exactly one unbeaten candidate.
    /// Contains the names of all the unbeaten candidates (possibly none).
    ResolverInvariantViolated { sources: Vec<String> },
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyRoster => write!(f, "no candidates were provided"),
            VotingErrors::CandidateCountExceeded { count, max } => write!(
                f,
                "maximum number of candidates is {}, but {} were provided",
                max, count
            ),
            VotingErrors::DuplicateCandidate { name } => {
                write!(f, "candidate {:?} is declared more than once", name)
            }
            VotingErrors::InvalidCandidateName { name, rank } => write!(
                f,
                "invalid vote: {:?} at rank {} is not a candidate",
                name,
                rank + 1
            ),
            VotingErrors::IncompleteBallot { expected, found } => write!(
                f,
                "invalid vote: {} candidates must be ranked, but the ballot has {} ranks",
                expected, found
            ),
            VotingErrors::DuplicateRanking { name } => {
                write!(f, "invalid vote: candidate {:?} is ranked more than once", name)
            }
            VotingErrors::RankOutOfRange { rank, ranks } => write!(
                f,
                "invalid vote: rank {} does not exist, the ballot has {} ranks",
                rank + 1,
                ranks
            ),
            VotingErrors::CountOverflow { count } => {
                write!(f, "a ballot with count {} overflows the vote counters", count)
            }
            VotingErrors::ForeignBallot => {
                write!(f, "the ballot was filled for another list of candidates")
            }
            VotingErrors::ResolverInvariantViolated { sources } => write!(
                f,
                "expected a single unbeaten candidate after locking, found {:?}",
                sources
            ),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionRules {
    /// The largest roster accepted. Rosters above this size are rejected
    /// before any ballot is read.
    pub max_candidates: usize,
}

impl ElectionRules {
    pub const MAX_CANDIDATES: usize = 9;

    pub const DEFAULT_RULES: ElectionRules = ElectionRules {
        max_candidates: ElectionRules::MAX_CANDIDATES,
    };
}

impl Default for ElectionRules {
    fn default() -> Self {
        ElectionRules::DEFAULT_RULES
    }
}
