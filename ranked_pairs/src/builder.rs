pub use crate::config::*;
use crate::{Ballot, BallotRecorder, ElectionState};

/// A builder for adding votes.
///
/// Votes are checked and counted as soon as they are added: the builder does
/// not keep the ballots around.
///
/// The first invalid vote ends the election: every later call returns that error.
///
/// ```
/// pub use ranked_pairs::builder::Builder;
/// pub use ranked_pairs::ElectionRules;
/// # use ranked_pairs::VotingErrors;
///
/// let mut builder = Builder::new(&ElectionRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string(), "Bob".to_string()])?;
/// builder.add_vote(&["Bob".to_string(), "Anna".to_string(), "Clara".to_string()], 2)?;
///
/// let result = builder.tally()?;
/// assert_eq!(result.winner, "Bob");
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ElectionRules,
    pub(crate) _state: Option<ElectionState>,
    pub(crate) _error: Option<VotingErrors>,
}

impl Builder {
    pub fn new(rules: &ElectionRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _state: None,
            _error: None,
        })
    }

    /// Registers the candidates, in order.
    ///
    /// The roster is validated here, before any vote can be added.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        let state = ElectionState::new(cands, &self._rules)?;
        Ok(Builder {
            _rules: self._rules,
            _state: Some(state),
            _error: None,
        })
    }

    /// Adds a vote to the builder.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        self.add_vote(candidates, 1)
    }

    /// Adds a vote, with a weight attached to it.
    ///
    /// candidates: the list of choices made by the voter, in order. All the candidates
    /// must be ranked exactly once.
    /// If the vote is invalid, nothing is counted.
    pub fn add_vote(&mut self, candidates: &[String], count: u64) -> Result<(), VotingErrors> {
        let state = self.live_state_mut()?;
        let res = state
            .check_ballot(candidates)
            .and_then(|ballot| state.record_ballot(&ballot, count));
        self.keep_error(res)
    }

    /// Starts a ballot that is filled rank by rank.
    ///
    /// A ballot that fails to fill in must be dropped, and ends the election
    /// like an invalid vote: see [Builder::abort].
    pub fn ballot(&self) -> Result<BallotRecorder<'_>, VotingErrors> {
        self.check_live()?;
        let state = self._state.as_ref().ok_or(VotingErrors::EmptyRoster)?;
        Ok(state.recorder())
    }

    /// Counts a ballot obtained from [Builder::ballot].
    pub fn add_ballot(&mut self, ballot: &Ballot, count: u64) -> Result<(), VotingErrors> {
        let state = self.live_state_mut()?;
        let res = state.record_ballot(ballot, count);
        self.keep_error(res)
    }

    /// Ends the election with an error raised while filling a ballot.
    pub fn abort(&mut self, err: VotingErrors) {
        if self._error.is_none() {
            self._error = Some(err);
        }
    }

    /// Runs the election over all the votes added so far.
    pub fn tally(&self) -> Result<ElectionResult, VotingErrors> {
        self.check_live()?;
        let state = self._state.as_ref().ok_or(VotingErrors::EmptyRoster)?;
        state.tabulate()
    }

    fn check_live(&self) -> Result<(), VotingErrors> {
        match &self._error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn live_state_mut(&mut self) -> Result<&mut ElectionState, VotingErrors> {
        self.check_live()?;
        self._state.as_mut().ok_or(VotingErrors::EmptyRoster)
    }

    fn keep_error(&mut self, res: Result<(), VotingErrors>) -> Result<(), VotingErrors> {
        if let Err(err) = &res {
            self.abort(err.clone());
        }
        res
    }
}
