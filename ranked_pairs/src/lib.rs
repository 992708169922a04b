mod config;
mod graph;

pub mod builder;
pub mod manual;

use log::{debug, info};

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    ops::{Add, AddAssign},
    sync::atomic::{self, AtomicU64},
};

pub use crate::config::*;
use crate::graph::LockedGraph;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct CandidateId(pub(crate) usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);

    fn checked_add(self, rhs: VoteCount) -> Option<VoteCount> {
        self.0.checked_add(rhs.0).map(VoteCount)
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

/// The registered candidates of an election.
///
/// The position of a name in the roster is its identity everywhere else.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Roster {
    // Unique per roster. Ballots carry it to be counted only by their election.
    id: u64,
    names: Vec<String>,
    ids: HashMap<String, CandidateId>,
}

static NEXT_ROSTER_ID: AtomicU64 = AtomicU64::new(0);

impl Roster {
    fn new(names: &[String], rules: &ElectionRules) -> Result<Roster, VotingErrors> {
        if names.is_empty() {
            return Err(VotingErrors::EmptyRoster);
        }
        if names.len() > rules.max_candidates {
            return Err(VotingErrors::CandidateCountExceeded {
                count: names.len(),
                max: rules.max_candidates,
            });
        }
        let mut ids: HashMap<String, CandidateId> = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            if ids.insert(name.clone(), CandidateId(idx)).is_some() {
                return Err(VotingErrors::DuplicateCandidate { name: name.clone() });
            }
        }
        Ok(Roster {
            id: NEXT_ROSTER_ID.fetch_add(1, atomic::Ordering::Relaxed),
            names: names.to_vec(),
            ids,
        })
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn name(&self, cid: CandidateId) -> &str {
        self.names[cid.0].as_str()
    }
}

/// A complete ranking of all the candidates of an election.
///
/// It can only be obtained through a [BallotRecorder], which guarantees that
/// every candidate appears exactly once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    roster_id: u64,
    ranks: Vec<CandidateId>,
}

/// Fills a ballot one rank at a time.
///
/// ```
/// use ranked_pairs::builder::Builder;
/// use ranked_pairs::ElectionRules;
/// # use ranked_pairs::VotingErrors;
///
/// let mut builder = Builder::new(&ElectionRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// let mut recorder = builder.ballot()?;
/// recorder.vote(0, "Bob")?;
/// recorder.vote(1, "Anna")?;
/// let ballot = recorder.finish()?;
/// builder.add_ballot(&ballot, 1)?;
///
/// assert_eq!(builder.tally()?.winner, "Bob");
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct BallotRecorder<'a> {
    roster: &'a Roster,
    ranks: Vec<Option<CandidateId>>,
}

impl<'a> BallotRecorder<'a> {
    fn new(roster: &'a Roster) -> BallotRecorder<'a> {
        BallotRecorder {
            roster,
            ranks: vec![None; roster.len()],
        }
    }

    /// The number of ranks to fill, which is the number of candidates.
    pub fn num_ranks(&self) -> usize {
        self.ranks.len()
    }

    /// Records the candidate for the given rank (starting at 0).
    ///
    /// If the name is not a candidate, nothing is recorded. The caller is then
    /// expected to drop the whole ballot.
    pub fn vote(&mut self, rank: usize, name: &str) -> Result<(), VotingErrors> {
        if rank >= self.ranks.len() {
            return Err(VotingErrors::RankOutOfRange {
                rank,
                ranks: self.ranks.len(),
            });
        }
        let cid = self
            .roster
            .ids
            .get(name)
            .ok_or_else(|| VotingErrors::InvalidCandidateName {
                name: name.to_string(),
                rank,
            })?;
        self.ranks[rank] = Some(*cid);
        Ok(())
    }

    /// Checks that every candidate was ranked exactly once.
    pub fn finish(self) -> Result<Ballot, VotingErrors> {
        let expected = self.ranks.len();
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(expected);
        for rank in self.ranks.iter() {
            match rank {
                Some(cid) if !seen.insert(*cid) => {
                    return Err(VotingErrors::DuplicateRanking {
                        name: self.roster.name(*cid).to_string(),
                    });
                }
                Some(cid) => ranks.push(*cid),
                None => {}
            }
        }
        if ranks.len() != expected {
            return Err(VotingErrors::IncompleteBallot {
                expected,
                found: ranks.len(),
            });
        }
        Ok(Ballot {
            roster_id: self.roster.id,
            ranks,
        })
    }
}

/// preferences[a][b] is the number of ballots ranking a above b.
///
/// The diagonal is never written.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PreferenceMatrix {
    size: usize,
    counts: Vec<VoteCount>,
}

impl PreferenceMatrix {
    fn new(size: usize) -> PreferenceMatrix {
        PreferenceMatrix {
            size,
            counts: vec![VoteCount::EMPTY; size * size],
        }
    }

    fn get(&self, a: CandidateId, b: CandidateId) -> VoteCount {
        self.counts[a.0 * self.size + b.0]
    }

    fn cells<'r>(&self, ranks: &'r [CandidateId]) -> impl Iterator<Item = usize> + 'r {
        let size = self.size;
        ranks.iter().enumerate().flat_map(move |(i, &above)| {
            ranks[i + 1..]
                .iter()
                .map(move |&below| above.0 * size + below.0)
        })
    }

    /// Adds one complete ranking, repeated `count` times.
    ///
    /// Returns None and leaves the matrix unchanged if a cell would overflow.
    fn record_preferences(&mut self, ranks: &[CandidateId], count: VoteCount) -> Option<()> {
        if self
            .cells(ranks)
            .any(|cell| self.counts[cell].checked_add(count).is_none())
        {
            return None;
        }
        for cell in self.cells(ranks) {
            self.counts[cell] += count;
        }
        Some(())
    }

    fn to_rows(&self) -> Vec<Vec<u64>> {
        self.counts
            .chunks(self.size)
            .map(|row| row.iter().map(|vc| vc.0).collect())
            .collect()
    }
}

// Matrices built from disjoint sets of ballots can be merged.
impl AddAssign<&PreferenceMatrix> for PreferenceMatrix {
    fn add_assign(&mut self, rhs: &PreferenceMatrix) {
        assert_eq!(self.size, rhs.size, "Merging matrices of different sizes");
        for (c, other) in self.counts.iter_mut().zip(rhs.counts.iter()) {
            *c += *other;
        }
    }
}

/// A majority preference: more ballots rank the winner above the loser than the opposite.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub(crate) struct Pair {
    pub(crate) winner: CandidateId,
    pub(crate) loser: CandidateId,
}

/// The pairs for which one candidate is preferred over the other, by increasing
/// (i, j) with i < j. Ties do not produce a pair.
fn add_pairs(preferences: &PreferenceMatrix) -> Vec<Pair> {
    let mut pairs: Vec<Pair> = Vec::new();
    for i in 0..preferences.size {
        for j in (i + 1)..preferences.size {
            let (a, b) = (CandidateId(i), CandidateId(j));
            match preferences.get(a, b).cmp(&preferences.get(b, a)) {
                Ordering::Greater => pairs.push(Pair {
                    winner: a,
                    loser: b,
                }),
                Ordering::Less => pairs.push(Pair {
                    winner: b,
                    loser: a,
                }),
                Ordering::Equal => {}
            }
        }
    }
    pairs
}

/// The order in which pairs are locked: strongest victory first, then by
/// winner and loser in roster order.
///
/// This is a total order over distinct pairs, so the sorting algorithm does not
/// matter for the outcome.
fn compare_pairs(preferences: &PreferenceMatrix, a: &Pair, b: &Pair) -> Ordering {
    preferences
        .get(b.winner, b.loser)
        .cmp(&preferences.get(a.winner, a.loser))
        .then_with(|| a.winner.cmp(&b.winner))
        .then_with(|| a.loser.cmp(&b.loser))
}

fn sort_pairs(pairs: &mut [Pair], preferences: &PreferenceMatrix) {
    pairs.sort_by(|a, b| compare_pairs(preferences, a, b));
}

/// The winner is the only candidate that no locked edge points to.
fn find_winner(graph: &LockedGraph, roster: &Roster) -> Result<CandidateId, VotingErrors> {
    match graph.sources().as_slice() {
        [winner] => Ok(*winner),
        sources => Err(VotingErrors::ResolverInvariantViolated {
            sources: sources
                .iter()
                .map(|cid| roster.name(*cid).to_string())
                .collect(),
        }),
    }
}

/// All the state of one election. Dropped once the result is computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct ElectionState {
    roster: Roster,
    preferences: PreferenceMatrix,
    num_ballots: VoteCount,
}

impl ElectionState {
    pub(crate) fn new(
        candidates: &[String],
        rules: &ElectionRules,
    ) -> Result<ElectionState, VotingErrors> {
        let roster = Roster::new(candidates, rules)?;
        debug!("ElectionState: roster: {:?}", roster.names);
        let preferences = PreferenceMatrix::new(roster.len());
        Ok(ElectionState {
            roster,
            preferences,
            num_ballots: VoteCount::EMPTY,
        })
    }

    pub(crate) fn recorder(&self) -> BallotRecorder<'_> {
        BallotRecorder::new(&self.roster)
    }

    /// Validates a ballot made of candidate names. The ballot is not recorded.
    pub(crate) fn check_ballot(&self, names: &[String]) -> Result<Ballot, VotingErrors> {
        if names.len() != self.roster.len() {
            return Err(VotingErrors::IncompleteBallot {
                expected: self.roster.len(),
                found: names.len(),
            });
        }
        let mut recorder = self.recorder();
        for (rank, name) in names.iter().enumerate() {
            recorder.vote(rank, name)?;
        }
        recorder.finish()
    }

    pub(crate) fn record_ballot(&mut self, ballot: &Ballot, count: u64) -> Result<(), VotingErrors> {
        if ballot.roster_id != self.roster.id {
            return Err(VotingErrors::ForeignBallot);
        }
        let overflow = VotingErrors::CountOverflow { count };
        // The total is checked first: the matrix is only touched if both fit.
        let num_ballots = self
            .num_ballots
            .checked_add(VoteCount(count))
            .ok_or_else(|| overflow.clone())?;
        self.preferences
            .record_preferences(&ballot.ranks, VoteCount(count))
            .ok_or(overflow)?;
        self.num_ballots = num_ballots;
        Ok(())
    }

    pub(crate) fn tabulate(&self) -> Result<ElectionResult, VotingErrors> {
        info!(
            "Tabulating {:?} ballots for {:?} candidates",
            self.num_ballots.0,
            self.roster.len()
        );
        for (idx, name) in self.roster.names.iter().enumerate() {
            info!("Candidate: {}: {}", idx, name);
        }

        let mut pairs = add_pairs(&self.preferences);
        debug!("tabulate: extracted pairs: {:?}", pairs);
        sort_pairs(&mut pairs, &self.preferences);
        debug!("tabulate: ranked pairs: {:?}", pairs);

        let (graph, decisions) = graph::lock_pairs(self.roster.len(), &pairs);

        let pair_stats: Vec<PairStats> = pairs
            .iter()
            .zip(decisions.iter())
            .map(|(p, &locked)| PairStats {
                winner: self.roster.name(p.winner).to_string(),
                loser: self.roster.name(p.loser).to_string(),
                margin: self.preferences.get(p.winner, p.loser).0,
                opposition: self.preferences.get(p.loser, p.winner).0,
                locked,
            })
            .collect();
        for ps in pair_stats.iter() {
            info!(
                "{} over {} ({} to {}) -> {}",
                ps.winner,
                ps.loser,
                ps.margin,
                ps.opposition,
                if ps.locked { "locked" } else { "skipped" }
            );
        }

        let winner = find_winner(&graph, &self.roster)?;
        info!("Winner: {}", self.roster.name(winner));

        Ok(ElectionResult {
            winner: self.roster.name(winner).to_string(),
            candidates: self.roster.names.clone(),
            preferences: self.preferences.to_rows(),
            pairs: pair_stats,
            num_ballots: self.num_ballots.0,
        })
    }
}

/// Runs the ranked pairs algorithm over the given votes.
///
/// Arguments:
/// * `coll` the collection of votes to process. Every vote must rank all the candidates.
/// * `candidates` the registered candidates for this election, in order. The order is
/// used to break ties between pairs of equal strength.
/// * `rules` the rules that govern this election
///
/// The first invalid vote stops the election: no partial result is returned.
pub fn run_election(
    coll: &[Vote],
    candidates: &[String],
    rules: &ElectionRules,
) -> Result<ElectionResult, VotingErrors> {
    info!(
        "Processing {:?} votes, candidates: {:?}, rules: {:?}",
        coll.len(),
        candidates,
        rules
    );
    let mut state = ElectionState::new(candidates, rules)?;
    for v in coll.iter() {
        let ballot = state.check_ballot(&v.candidates)?;
        state.record_ballot(&ballot, v.count)?;
    }
    state.tabulate()
}
