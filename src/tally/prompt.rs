// Interactive entry of the ballots on a terminal.

use std::io::{BufRead, Write};

use ranked_pairs::builder::Builder;

use crate::tally::*;

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> BTallyResult<String> {
    write!(output, "{}", question).context(TerminalSnafu)?;
    output.flush().context(TerminalSnafu)?;
    let mut line = String::new();
    let num_read = input.read_line(&mut line).context(TerminalSnafu)?;
    if num_read == 0 {
        return EndOfInputSnafu.fail().map_err(Box::new);
    }
    Ok(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string())
}

/// Asks until a non-negative number is entered.
fn ask_number<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> BTallyResult<u64> {
    loop {
        let answer = ask(input, output, question)?;
        match answer.trim().parse::<u64>() {
            Ok(n) => return Ok(n),
            Err(_) => debug!("ask_number: not a number: {:?}", answer),
        }
    }
}

/// Asks for the ranks of one voter. Stops at the first invalid name.
fn fill_ballot<R: BufRead, W: Write>(
    mut recorder: BallotRecorder<'_>,
    input: &mut R,
    output: &mut W,
) -> BTallyResult<Result<Ballot, VotingErrors>> {
    for rank in 0..recorder.num_ranks() {
        let name = ask(input, output, &format!("Rank {}: ", rank + 1))?;
        if let Err(e) = recorder.vote(rank, &name) {
            return Ok(Err(e));
        }
    }
    Ok(recorder.finish())
}

/// Asks for the number of voters, then for every rank of every voter.
/// Each ballot is recorded once it is complete. Returns the number of voters.
pub fn prompt_ballots<R: BufRead, W: Write>(
    builder: &mut Builder,
    mut input: R,
    mut output: W,
) -> BTallyResult<u64> {
    let num_voters = ask_number(&mut input, &mut output, "Number of voters: ")?;
    for voter in 0..num_voters {
        let recorder = builder.ballot().context(VotingSnafu)?;
        let ballot = match fill_ballot(recorder, &mut input, &mut output)? {
            Ok(ballot) => ballot,
            Err(e) => {
                builder.abort(e.clone());
                return Err(e).context(VotingSnafu).map_err(Box::new);
            }
        };
        debug!("prompt_ballots: voter {}: {:?}", voter + 1, ballot);
        builder.add_ballot(&ballot, 1).context(VotingSnafu)?;
        writeln!(output).context(TerminalSnafu)?;
    }
    Ok(num_voters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn builder(names: &[&str]) -> Builder {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        Builder::new(&ElectionRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names)
            .unwrap()
    }

    #[test]
    fn two_voters() {
        let mut b = builder(&["Alice", "Bob"]);
        let mut out: Vec<u8> = Vec::new();
        let input = Cursor::new("2\nAlice\nBob\r\nAlice\nBob\n");
        let n = prompt_ballots(&mut b, input, &mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Number of voters: Rank 1: Rank 2: \nRank 1: Rank 2: \n"
        );
        let res = b.tally().unwrap();
        assert_eq!(res.num_ballots, 2);
        assert_eq!(res.preferences, vec![vec![0, 2], vec![0, 0]]);
        assert_eq!(res.winner, "Alice");
    }

    #[test]
    fn voter_count_is_asked_again() {
        let mut b = builder(&["Alice", "Bob"]);
        let mut out: Vec<u8> = Vec::new();
        let input = Cursor::new("many\n1\nBob\nAlice\n");
        assert_eq!(prompt_ballots(&mut b, input, &mut out).unwrap(), 1);
        assert_eq!(b.tally().unwrap().winner, "Bob");
    }

    #[test]
    fn unknown_name_stops_the_entry() {
        let mut b = builder(&["Alice", "Bob"]);
        let input = Cursor::new("1\nZoe\nBob\n");
        let err = prompt_ballots(&mut b, input, Vec::new()).unwrap_err();
        assert_eq!(
            err.voting_error(),
            Some(&VotingErrors::InvalidCandidateName {
                name: "Zoe".to_string(),
                rank: 0
            })
        );
        assert!(b.tally().is_err());
    }

    #[test]
    fn names_are_not_trimmed() {
        let mut b = builder(&["Alice", "Bob"]);
        let input = Cursor::new("1\nAlice \nBob\n");
        let err = prompt_ballots(&mut b, input, Vec::new()).unwrap_err();
        assert!(matches!(err.voting_error(), Some(VotingErrors::InvalidCandidateName { .. })));
    }

    #[test]
    fn input_ends_early() {
        let mut b = builder(&["Alice", "Bob"]);
        let err = prompt_ballots(&mut b, Cursor::new("2\nAlice\nBob\n"), Vec::new()).unwrap_err();
        assert!(matches!(*err, TallyError::EndOfInput {}));
    }
}
