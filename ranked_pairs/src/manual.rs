/*!

This is the long-form manual for `ranked_pairs` and the `tideman` program.

## How the winner is chosen

Every voter ranks all the candidates, from the most preferred to the least preferred.
The votes are then counted in the following steps:

1. For every two candidates `A` and `B`, count the ballots that rank `A` above `B`.
2. Whenever more ballots prefer `A` over `B` than `B` over `A`, `A` wins the pair
   (`A`, `B`). If both counts are equal, there is no pair.
3. The pairs are sorted from the strongest victory (the largest number of ballots
   preferring the winner) to the weakest. Pairs of equal strength are sorted by the
   position of the winner in the list of candidates, then by the position of the loser.
4. The pairs are locked in that order as edges `winner -> loser` of a graph. A pair is
   skipped if the loser already beats the winner through the edges locked so far,
   because adding it would create a cycle.
5. The winner is the candidate that no locked edge points to.

The order of the candidates matters: it is the tie-break between pairs of equal strength.

## Quick start

Candidates are passed on the command line. When no input file is given, the program
asks for the number of voters and then for the ranks of every voter:

```text
$ tideman Alice Bob Charlie
Number of voters: 3
Rank 1: Alice
Rank 2: Charlie
Rank 3: Bob

Rank 1: Charlie
Rank 2: Alice
Rank 3: Bob

Rank 1: Alice
Rank 2: Bob
Rank 3: Charlie

Alice
```

The last line is the name of the winner. A name that is not a candidate stops the
election immediately.

Exit statuses:
- `1` no candidates were provided
- `2` too many candidates (9 by default, see `--max-candidates`)
- `3` invalid vote: unknown name, candidate ranked twice or missing ranks
- `4` any other error (files, configuration, no single winner, reference mismatch)

## Input formats

Ballots can also be read from a file with `--input` and `--input-type`:

### `csv`

Each line is a ballot, each column (in order) is a rank.

```text
Alice,Bob,Charlie
Charlie,Alice,Bob
```

With a configuration file, the position of the first rank, the first ballot row and
an optional count column can be changed:

```text
id,count,rank 1,rank 2,rank 3
b1,20,Alice,Bob,Charlie
b2,12,Charlie,Alice,Bob
```

### `xlsx`

An Excel workbook with the same layout as the CSV format. The first worksheet is read,
unless another one is named with `excelWorksheetName` (or `--excel-worksheet-name`).

### `json`

```json
{ "ballots": [ { "ranking": ["Alice", "Bob", "Charlie"], "count": 20 } ] }
```

The count is optional and defaults to 1.

## Configuration

An election can be described in a JSON file passed with `--config`:

```json
{
  "outputSettings": { "contestName": "Board chair" },
  "candidates": [ { "name": "Alice" }, { "name": "Bob" }, { "name": "Charlie" } ],
  "ballotSources": [
    { "provider": "csv", "filePath": "ballots.csv",
      "firstVoteColumnIndex": 3, "firstVoteRowIndex": 2, "countColumnIndex": 2 }
  ],
  "rules": { "maxCandidates": 9 }
}
```

- `filePath` is relative to the configuration file.
- the indexes start at 1. Columns may also be given as letters (`"C"`).

The summary of the election (preference matrix, ranked pairs and the locking decisions)
is written in JSON with `--out`. With `--reference`, the summary is compared to a
reference file and the differences are printed.

 */
