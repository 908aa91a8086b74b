/*!

This is the long-form manual for `ranked_leaderboard` and `lbnorm`.

## Ranking rules

Players are ordered by the following criteria. A criterion is only looked at
when all the previous ones are equal.

1. **Total**, highest first. When the results table has a `Total` (or `Pts`,
   `Points`) column with a number for this player, that number is used.
   Otherwise the total is the sum of the round scores.
2. **Spend**, lowest first.
3. **Countback**. The round scores of each player are sorted from highest to
   lowest and compared one by one. The first player with a higher score wins.
   When one player has played fewer rounds, the missing rounds count as zero.
4. **Name**, alphabetically and ignoring case.

The last criterion only makes the output deterministic. Two players that
differ only by their names are still considered tied: they share the same
`tie_group` and both have `tie_highlight` set.

Numbers are compared to the millionth: `0.1 + 0.2` and `0.3` are equal.

## Ranks and tie groups

The `rank` column is always positional, from 1 to the number of players.
Ranks are never shared, even for tied players.

Every player belongs to a tie group. Tie groups are numbered from 1, in the
order in which they appear on the leaderboard. A group with a single player
is not a tie.

|  name | total | spend | rank | tie_group | tie_highlight |
|-------|-------|-------|------|-----------|---------------|
|   Bob |    10 |     3 |    1 |         1 | false         |
| Alice |    10 |     5 |    2 |         2 | false         |
|  Dana |     8 |     0 |    3 |         3 | true          |
|  Eve  |     8 |     0 |    4 |         3 | true          |

## Input format

`lbnorm` reads the first worksheet of an Excel (.xlsx) file. The first row
holds the headers:

- the player name column is called `Player` or `Name`;
- round columns are the numeric columns, typically `R01`, `R02`, ...;
- the spend column contains `spend`, `spent`, `$m` or `$` in its header;
- an optional column whose header contains `Total`, `Pts` or `Points` (such
  as `Total Pts`) holds a precomputed total;
- `Pos`, `Position` and `Rank` columns are ignored.

Empty cells, `-` and `D$Q` count as zero. Spend values such as `$1,234.50`
are understood; any other unreadable spend counts as zero.

## Configuration

All the options of the command line may also be given in a JSON file with the
`--config` flag. The command line takes precedence.

```json
{
  "inputFile": "leaderboard.xlsx",
  "outputDirectory": "Test2/output",
  "worksheetName": "Sheet1",
  "reader": "auto",
  "nameColumn": "Player"
}
```

 */
