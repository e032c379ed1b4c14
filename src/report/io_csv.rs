// Primitives for reading the CSV exports.

use std::path::Path;

use log::debug;
use snafu::prelude::*;

use vote_summary::VoteValue;

use crate::report::*;

pub const QUESTION_NUMBER: &str = "Question Number";
pub const VOTE_TITLE: &str = "Vote Title";
pub const QUESTION_TITLE: &str = "Question Title";

/// One vote, as exported.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRow {
    pub question: u32,
    pub vote: VoteValue,
    pub title: String,
}

pub fn read_survey_csv(path: &Path) -> BReportResult<Vec<SurveyRow>> {
    let path_s = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path_s.clone(),
        })?;

    let header = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .clone();
    debug!("read_survey_csv: header: {:?}", header);
    let names: Vec<&str> = header.iter().map(clean_header).collect();
    let question_idx = column_index(&names, QUESTION_NUMBER, &path_s)?;
    let vote_idx = column_index(&names, VOTE_TITLE, &path_s)?;
    let title_idx = column_index(&names, QUESTION_TITLE, &path_s)?;

    let mut res: Vec<SurveyRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_survey_csv: skipping empty line {}", lineno);
            continue;
        }
        let question_s = line.get(question_idx).context(CsvLineToShortSnafu { lineno })?;
        let question = parse_question_number(question_s).context(CsvQuestionNumberSnafu {
            lineno,
            content: question_s,
        })?;
        let vote_s = line.get(vote_idx).context(CsvLineToShortSnafu { lineno })?;
        let title = line.get(title_idx).context(CsvLineToShortSnafu { lineno })?;

        let row = SurveyRow {
            question,
            vote: VoteValue::parse(vote_s),
            title: title.to_string(),
        };
        debug!("read_survey_csv: lineno: {:?} row: {:?}", lineno, row);
        res.push(row);
    }
    Ok(res)
}

// Exports may start with a byte order mark.
fn clean_header(s: &str) -> &str {
    s.trim_start_matches('\u{feff}').trim()
}

fn column_index(names: &[&str], column: &str, path: &str) -> ReportResult<usize> {
    names
        .iter()
        .position(|n| *n == column)
        .context(CsvMissingColumnSnafu { column, path })
}

// Spreadsheets sometimes write whole numbers as "3.0".
fn parse_question_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(x) = s.parse::<u32>() {
        return Some(x);
    }
    match s.parse::<f64>() {
        Ok(x) if x.fract() == 0.0 && x >= 0.0 && x <= u32::MAX as f64 => Some(x as u32),
        _ => None,
    }
}
