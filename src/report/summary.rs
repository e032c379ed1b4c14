// The JSON summary of a report, and its comparison with a reference summary.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use text_diff::print_diff;

use vote_summary::QuestionStats;

use crate::report::io_common::simplify_file_name;
use crate::report::*;

/// What was computed and written for one question.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub question: u32,
    pub title: String,
    pub votes: usize,
    pub numeric: usize,
    pub trimmed: usize,
    pub kept: usize,
    pub statistic: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub answer: Option<String>,
    pub page: String,
    pub chart: Option<String>,
}

impl QuestionSummary {
    pub fn new(
        group: &QuestionGroup,
        stats: &QuestionStats,
        statistic: String,
        answer: Option<String>,
        page: String,
        chart: Option<String>,
    ) -> QuestionSummary {
        QuestionSummary {
            question: group.number,
            title: group.title.clone(),
            votes: stats.total,
            numeric: stats.numeric,
            trimmed: stats.trimmed,
            kept: stats.kept,
            statistic,
            min: stats.min,
            max: stats.max,
            answer,
            page,
            chart,
        }
    }
}

fn chart_kind_name(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Box => "box",
        ChartKind::Swarm => "swarm",
    }
}

pub fn build_summary_js(settings: &ReportSettings, summaries: &[QuestionSummary]) -> JSValue {
    json!({
        "config": {
            "datafile": simplify_file_name(&settings.datafile),
            "trim": settings.trim.value(),
            "chartKind": chart_kind_name(settings.chart_kind),
            "noCharts": settings.no_charts,
        },
        "results": summaries,
    })
}

/// The summary location that designates the standard output.
pub const STDOUT: &str = "stdout";

pub fn write_summary(out: &str, pretty_js_summary: &str) -> ReportResult<()> {
    if out == STDOUT {
        println!("{}", pretty_js_summary);
        return Ok(());
    }
    info!("Writing summary to {}", out);
    fs::write(out, pretty_js_summary).context(WritingOutputSnafu { path: out })
}

fn read_summary(path: &Path) -> ReportResult<JSValue> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_s.clone(),
    })?;
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: path_s })?;
    Ok(js)
}

/// Fails if the computed summary differs from the reference, after printing the differences.
pub fn check_reference(path: &Path, pretty_js_summary: &str) -> ReportResult<()> {
    let summary_ref = read_summary(path)?;
    debug!("check_reference: reference: {:?}", summary_ref);
    // Reformatting the reference makes the comparison insensitive to whitespace.
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        return SummaryMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{QuestionGroup, ReportError, ReportSettings};
    use std::path::PathBuf;
    use vote_summary::{summarize, TrimFraction, VoteValue};

    fn summary() -> QuestionSummary {
        let group = QuestionGroup {
            number: 3,
            title: "Beans".to_string(),
            votes: vec![VoteValue::Number(2.0), VoteValue::Missing],
        };
        let stats = summarize(&group.votes, TrimFraction::NONE);
        QuestionSummary::new(
            &group,
            &stats,
            "2".to_string(),
            None,
            "question-3.pdf".to_string(),
            Some("figure-3.png".to_string()),
        )
    }

    #[test]
    fn summary_json() {
        let settings = ReportSettings::new(PathBuf::from("/data/votes.csv"));
        let js = build_summary_js(&settings, &[summary()]);
        assert_eq!(js["config"]["datafile"], "votes.csv");
        assert_eq!(js["config"]["chartKind"], "box");
        assert_eq!(js["results"][0]["question"], 3);
        assert_eq!(js["results"][0]["votes"], 2);
        assert_eq!(js["results"][0]["numeric"], 1);
        assert_eq!(js["results"][0]["answer"], JSValue::Null);
    }

    #[test]
    fn reference_ignores_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ref.json");
        fs::write(&p, r#"{"a":   [1, 2],   "b": "x"}"#).unwrap();
        let pretty = serde_json::to_string_pretty(&json!({"a": [1, 2], "b": "x"})).unwrap();
        check_reference(&p, &pretty).unwrap();

        let other = serde_json::to_string_pretty(&json!({"a": [1, 3], "b": "x"})).unwrap();
        assert!(matches!(
            check_reference(&p, &other),
            Err(ReportError::SummaryMismatch {})
        ));
    }
}
