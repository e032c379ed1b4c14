/*!

This is the long-form manual for `vote_summary` and the `crowdpurr` report tool.

## Input format

The tool reads the CSV export of a crowd-voting session. The first row is a
header. The following columns are used, in any order (all the other columns
are ignored):

* `Question Number` the integer identifier of the question. All the rows with
  the same number are the votes for this question.
* `Vote Title` the answer given by one voter.
* `Question Title` the text of the question, used as the title of the page.

### Votes

The content of `Vote Title` is decoded as follows:

| content                          | value                |
|----------------------------------|----------------------|
| `-` or empty                     | missing              |
| `Yes` / `No` (any case)          | boolean              |
| `1250`, `-3.5`, `12,500.25`      | number               |
| anything else                    | text                 |

Only numbers are used in the statistics. Thousands separators are accepted
only when they are correctly placed: `1,2` is text.

## Trimmed mean

With a trim fraction `t` and `n` numeric votes, `floor(n * t)` votes are
removed from each end of the sorted votes. When `t > 0`, at least one vote is
removed from each end, but at least one vote always remains: for `n` votes, no
more than `(n - 1) / 2` votes are removed from each end.

The displayed answer is the floor of the mean, with `,` as thousands separator.
A question without any numeric vote displays `NaN`. Very large means are
displayed in full, and a mean that is not a finite number also displays `NaN`.

## Answers

An optional JSON file gives the correct answer of each question, keyed by the
question number:

```json
{
  "1": { "q": "How many jelly beans are in the jar?", "a": "1,402" },
  "2": { "q": "How tall is the tower (m)?", "a": "324" }
}
```

When it is provided, every question of the survey must have an entry.

## Configuration

All the options of the command line can also be given in a JSON file passed
with `--config`. The command line takes precedence.

```json
{
  "outputDirectory": "out",
  "trim": 0.1,
  "chartKind": "swarm",
  "answersFile": "answers.json",
  "fontFile": "fonts/DejaVuSans.ttf",
  "placeholderImage": "blank.png",
  "noCharts": false
}
```

Relative paths are resolved from the directory of the configuration file.

*/
