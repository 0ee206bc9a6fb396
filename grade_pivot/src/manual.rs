/*!

This is the long-form manual for `grade_pivot` and `pivotgrades`.

## Input format

The grade export is a delimited text file (comma, semicolon, tab or pipe, detected from
the header line) with one line per candidate and question. The following columns are
required, other columns are ignored:

* `CandidateExternalId` the candidate number used on the exam
* `UserId` the internal user identifier
* `QuestionTitle` the title of the question, which becomes a column title
* `ManuallyGradedScore` the score given by a grader, may be empty
* `AutoGradedScore` the score computed automatically, may be empty

The score of an answer is the manual score when there is one, and the automatic score
otherwise. Markers such as `NaN`, `N/A`, `NA`, `null` or `None` count as no score.
Candidate numbers are compared as they are written out, so `01` and `1` are the same
candidate. When several lines exist for the same candidate and question, the first
non-empty score is used. Pass `--strict` to reject such files instead.

## Roster

The optional roster (`-s`) is an Excel workbook (`.xlsx`). Its first worksheet is read,
unless `--roster-sheet` names another one. The first row is the header. The column
`Nafn í prófi` (change it with `--roster-key`) holds the candidate number, which is
matched against `CandidateExternalId`. All the students of the roster and all the
candidates of the export are kept, even when they have no counterpart.

## Column order

By default, the questions are sorted by title. Two other orders are available, but not
at the same time:

### Order file (`-c`)

A text file with one question title per line. The listed questions come first, in the
order of the file. The questions not listed follow in the default order. Listed titles
that are not in the export are ignored.

### Regular expression (`-r`)

A regular expression with exactly one capturing group, matched at the start of each
question title.

* `-r "Okt24-(\d+)"` sorts by the number after `Okt24-`
* `-r "Q(\d+)"` sorts `Q1`, `Q2`, `Q10` in numeric order
* `-r "([A-Za-z]+)"` sorts by alphabetic prefix

When the captured text is a number, the order is numeric. Other captured texts are
sorted as text, after all the numbers. Titles that do not match come last.

## Output

The output workbook has one row per candidate (and per roster student), a bold and frozen
header, an auto-filter, and a final `Total Score` column with the sum of the question
columns of each row. Without `-o`, the file is written next to the export as
`pivoted-<name>.xlsx`. Use `--dry-run` to see the order of the questions without
writing anything.

## Run configuration

All the options can also be stored in a JSON file passed with `--config`:

```json
{
  "gradesFile": "grades.csv",
  "studentsFile": "students.xlsx",
  "rosterKey": "Nafn í prófi",
  "outputFile": "results.xlsx",
  "regex": "Q(\\d+)",
  "strictDuplicates": false
}
```

Relative paths are resolved from the directory of the configuration file. Options given
on the command line take precedence.

*/
