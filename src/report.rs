use log::{debug, info};

use snafu::{prelude::*, Snafu};

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use vote_summary::*;

use crate::report::chart::{ChartImage, ChartKind};
use crate::report::io_answers::Answers;
use crate::report::io_common::{chart_file_name, page_file_name};
use crate::report::io_csv::SurveyRow;
use crate::report::summary::QuestionSummary;

pub mod chart;
pub mod config_reader;
pub mod font_metrics;
pub mod io_answers;
pub mod io_common;
pub mod io_csv;
pub mod page;
pub mod summary;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReportError {
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Column {column:?} is missing from the header of {path}"))]
    CsvMissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno} of the CSV file is too short"))]
    CsvLineToShort { lineno: usize },
    #[snafu(display("Line {lineno}: could not read the question number {content:?}"))]
    CsvQuestionNumber { lineno: usize, content: String },

    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary in JSON format"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("No answer for question {question} in {path}"))]
    MissingAnswer { question: u32, path: String },

    #[snafu(display("Invalid trim fraction"))]
    InvalidTrim { source: SummaryError },

    #[snafu(display("Error reading font file {path}"))]
    FontRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid font file {path}: {message}"))]
    FontInvalid { path: String, message: String },
    #[snafu(display("Error drawing chart: {message}"))]
    Drawing { message: String },
    #[snafu(display("Error with image file {path}"))]
    ImageIo {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Error compressing image data"))]
    Compressing { source: std::io::Error },
    #[snafu(display("Error encoding PDF: {message}"))]
    PdfEncode { message: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Difference detected between the computed summary and the reference summary"))]
    SummaryMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

pub type BReportResult<T> = Result<T, Box<ReportError>>;

/// All the settings of a run, after merging the command line and the configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub datafile: PathBuf,
    pub out_dir: PathBuf,
    pub trim: TrimFraction,
    pub chart_kind: ChartKind,
    pub no_charts: bool,
    pub answers_file: Option<PathBuf>,
    pub font_file: Option<PathBuf>,
    pub placeholder_image: Option<PathBuf>,
    /// A file path or 'stdout'
    pub summary: Option<String>,
    pub reference: Option<PathBuf>,
}

impl ReportSettings {
    pub fn new(datafile: PathBuf) -> ReportSettings {
        ReportSettings {
            datafile,
            out_dir: PathBuf::from("."),
            trim: TrimFraction::NONE,
            chart_kind: ChartKind::Box,
            no_charts: false,
            answers_file: None,
            font_file: None,
            placeholder_image: None,
            summary: None,
            reference: None,
        }
    }
}

impl ReportSettings {
    // The standard output is kept for the summary when it is written there.
    fn progress_on_stderr(&self) -> bool {
        self.summary.as_deref() == Some(summary::STDOUT)
    }
}

/// All the votes for one question.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionGroup {
    pub number: u32,
    pub title: String,
    pub votes: Vec<VoteValue>,
}

/// Groups the rows by question number.
///
/// The groups are in the order in which the questions first appear. The title of
/// a question is the one of its first row.
pub fn group_by_question(rows: Vec<SurveyRow>) -> Vec<QuestionGroup> {
    let mut res: Vec<QuestionGroup> = Vec::new();
    let mut positions: HashMap<u32, usize> = HashMap::new();
    for row in rows {
        match positions.get(&row.question) {
            Some(idx) => res[*idx].votes.push(row.vote),
            None => {
                positions.insert(row.question, res.len());
                res.push(QuestionGroup {
                    number: row.question,
                    title: row.title,
                    votes: vec![row.vote],
                });
            }
        }
    }
    res
}

fn page_title(group: &QuestionGroup, prompt: Option<&str>) -> String {
    match prompt {
        _ if !group.title.trim().is_empty() => group.title.trim().to_string(),
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => format!("Question {}", group.number),
    }
}

fn process_question(
    group: &QuestionGroup,
    settings: &ReportSettings,
    answers: Option<&Answers>,
    placeholder: Option<&ChartImage>,
) -> ReportResult<QuestionSummary> {
    let stats = summarize(&group.votes, settings.trim);
    let statistic = format_statistic(stats.mean);
    debug!(
        "process_question: question {}: stats: {:?} -> {}",
        group.number, stats, statistic
    );

    let reference = match answers {
        Some(a) => Some(a.lookup(group.number)?),
        None => None,
    };
    let answer = reference.map(|r| r.answer_text());
    let title = page_title(group, reference.map(|r| r.q.as_str()));

    let (image, chart_name): (Cow<ChartImage>, Option<String>) = match placeholder {
        Some(p) => (Cow::Borrowed(p), None),
        None => {
            let label = if settings.font_file.is_some() {
                Some(title.as_str())
            } else {
                None
            };
            let img = chart::render_chart(
                &group.votes,
                settings.chart_kind,
                label,
                group.number as u64,
            )?;
            let name = chart_file_name(group.number);
            img.save_png(&settings.out_dir.join(&name))?;
            (Cow::Owned(img), Some(name))
        }
    };

    let content = page::PageContent {
        title: &title,
        chart: &image,
        statistic: &statistic,
        answer: answer.as_deref(),
    };
    let bytes = page::compose_page(&content)?;
    let page_name = page_file_name(group.number);
    page::write_page(&settings.out_dir.join(&page_name), &bytes)?;
    info!(
        "Question {}: {} ({} votes) -> {}",
        group.number, statistic, stats.total, page_name
    );

    Ok(QuestionSummary::new(
        group, &stats, statistic, answer, page_name, chart_name,
    ))
}

/// Runs the full report: one chart and one page per question.
pub fn run_report(settings: &ReportSettings) -> BReportResult<Vec<QuestionSummary>> {
    info!("settings: {:?}", settings);

    if let Some(font) = &settings.font_file {
        chart::register_font(font)?;
    }

    let rows = io_csv::read_survey_csv(&settings.datafile)?;
    let groups = group_by_question(rows);
    info!(
        "Read {} questions from {:?}",
        groups.len(),
        settings.datafile
    );

    let answers = match &settings.answers_file {
        Some(p) => {
            let a = io_answers::read_answers(p)?;
            info!("Read {} answers from {:?}", a.len(), p);
            Some(a)
        }
        None => None,
    };

    io_common::ensure_dir(&settings.out_dir)?;

    let placeholder = if settings.no_charts {
        Some(chart::placeholder(settings.placeholder_image.as_deref())?)
    } else {
        None
    };

    let mut res: Vec<QuestionSummary> = Vec::new();
    for group in groups.iter() {
        if settings.progress_on_stderr() {
            eprintln!("Processing question {}", group.number);
        } else {
            println!("Processing question {}", group.number);
        }
        res.push(process_question(
            group,
            settings,
            answers.as_ref(),
            placeholder.as_ref(),
        )?);
    }

    let summary_js = summary::build_summary_js(settings, &res);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;
    if let Some(out) = &settings.summary {
        summary::write_summary(out, &pretty_js_summary)?;
    }
    // The reference summary, if provided for comparison
    if let Some(reference) = &settings.reference {
        summary::check_reference(reference, &pretty_js_summary)?;
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::Path;

    use lopdf::{Document, Object};
    use tempfile::TempDir;

    const TWO_QUESTIONS: &str = "\
Player,Question Number,Question Title,Vote Title,Vote Time
ann,1,How many beans are in the jar?,1200,10:01
bob,1,How many beans are in the jar?,\"1,500\",10:01
cid,1,How many beans are in the jar?,-,10:02
dee,1,How many beans are in the jar?,900,10:02
eve,1,How many beans are in the jar?,40000,10:03
ann,2,How tall is the tower (m)?,300,10:05
bob,2,How tall is the tower (m)?,Yes,10:05
cid,2,How tall is the tower (m)?,330,10:06
";

    const ANSWERS: &str = r#"{
  "1": { "q": "Beans in the jar", "a": "1,402" },
  "2": { "q": "Height of the tower", "a": 324 }
}"#;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn setup(csv: &str) -> (TempDir, ReportSettings) {
        init();
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("votes.csv");
        fs::write(&data, csv).unwrap();
        let mut settings = ReportSettings::new(data);
        settings.out_dir = dir.path().join("out");
        (dir, settings)
    }

    fn output_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn image_streams(path: &Path) -> Vec<Vec<u8>> {
        let doc = Document::load(path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        doc.objects
            .values()
            .filter_map(|o| match o {
                Object::Stream(s) => match s.dict.get(b"Subtype") {
                    Ok(Object::Name(n)) if n.as_slice() == b"Image" => Some(s.content.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    #[test]
    fn charts_and_pages_per_question() {
        let (_dir, settings) = setup(TWO_QUESTIONS);
        let res = run_report(&settings).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            output_files(&settings.out_dir),
            vec![
                "figure-1.png",
                "figure-2.png",
                "question-1.pdf",
                "question-2.pdf"
            ]
        );
        assert_eq!(res[0].question, 1);
        assert_eq!(res[0].statistic, "10,900");
        assert_eq!(res[1].statistic, "315");
        assert_eq!(res[1].numeric, 2);
    }

    #[test]
    fn swarm_charts() {
        let (_dir, mut settings) = setup(TWO_QUESTIONS);
        settings.chart_kind = ChartKind::Swarm;
        run_report(&settings).unwrap();
        assert_eq!(output_files(&settings.out_dir).len(), 4);
    }

    #[test]
    fn trimmed_statistic() {
        let (_dir, mut settings) = setup(TWO_QUESTIONS);
        settings.trim = TrimFraction::new(0.1).unwrap();
        let res = run_report(&settings).unwrap();
        // 900 1200 1500 40000 -> 1200 1500
        assert_eq!(res[0].statistic, "1,350");
        assert_eq!(res[0].kept, 2);
        // Two values only: nothing can be removed.
        assert_eq!(res[1].statistic, "315");
    }

    #[test]
    fn nocharts_uses_the_same_placeholder() {
        let (_dir, mut settings) = setup(TWO_QUESTIONS);
        settings.no_charts = true;
        run_report(&settings).unwrap();
        assert_eq!(
            output_files(&settings.out_dir),
            vec!["question-1.pdf", "question-2.pdf"]
        );
        let im1 = image_streams(&settings.out_dir.join("question-1.pdf"));
        let im2 = image_streams(&settings.out_dir.join("question-2.pdf"));
        assert_eq!(im1.len(), 1);
        assert_eq!(im1, im2);
    }

    #[test]
    fn all_missing_question() {
        let (_dir, settings) = setup(
            "Question Number,Vote Title,Question Title\n7,-,Nobody knows\n7,,Nobody knows\n",
        );
        let res = run_report(&settings).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].statistic, "NaN");
        assert!(settings.out_dir.join("question-7.pdf").exists());
    }

    #[test]
    fn answers_are_displayed() {
        let (dir, mut settings) = setup(TWO_QUESTIONS);
        let answers = dir.path().join("answers.json");
        fs::write(&answers, ANSWERS).unwrap();
        settings.answers_file = Some(answers);
        let res = run_report(&settings).unwrap();
        assert_eq!(res[0].answer.as_deref(), Some("1,402"));
        assert_eq!(res[1].answer.as_deref(), Some("324"));
    }

    #[test]
    fn missing_answer_fails() {
        let (dir, mut settings) = setup(TWO_QUESTIONS);
        let answers = dir.path().join("answers.json");
        fs::write(&answers, r#"{"1": {"q": "Beans", "a": "1402"}}"#).unwrap();
        settings.answers_file = Some(answers);
        let err = run_report(&settings).unwrap_err();
        assert!(matches!(*err, ReportError::MissingAnswer { question: 2, .. }));
    }

    #[test]
    fn malformed_question_number_fails() {
        let (_dir, settings) = setup("Question Number,Vote Title,Question Title\nfirst,3,Q\n");
        let err = run_report(&settings).unwrap_err();
        assert!(matches!(*err, ReportError::CsvQuestionNumber { lineno: 2, .. }));
    }

    #[test]
    fn reference_summary() {
        let (dir, mut settings) = setup(TWO_QUESTIONS);
        settings.no_charts = true;
        let summary_path = dir.path().join("summary.json");
        settings.summary = Some(summary_path.display().to_string());
        run_report(&settings).unwrap();

        settings.summary = None;
        settings.reference = Some(summary_path.clone());
        run_report(&settings).unwrap();

        let altered = fs::read_to_string(&summary_path)
            .unwrap()
            .replace("10,900", "10,901");
        fs::write(&summary_path, altered).unwrap();
        let err = run_report(&settings).unwrap_err();
        assert!(matches!(*err, ReportError::SummaryMismatch {}));
    }

    #[test]
    fn summary_on_stdout_moves_progress_to_stderr() {
        let (_dir, mut settings) = setup(TWO_QUESTIONS);
        assert!(!settings.progress_on_stderr());
        settings.summary = Some("summary.json".to_string());
        assert!(!settings.progress_on_stderr());
        settings.summary = Some("stdout".to_string());
        assert!(settings.progress_on_stderr());
        settings.no_charts = true;
        assert_eq!(run_report(&settings).unwrap().len(), 2);
    }

    #[test]
    fn labelled_charts_with_font() {
        let font = match chart::tests::system_font() {
            Some(f) => f,
            None => {
                eprintln!("labelled_charts_with_font: no TrueType font found, skipping");
                return;
            }
        };
        let (_dir, mut settings) = setup(TWO_QUESTIONS);
        settings.chart_kind = ChartKind::Swarm;
        run_report(&settings).unwrap();
        let plain = fs::read(settings.out_dir.join("figure-1.png")).unwrap();

        settings.font_file = Some(font);
        let res = run_report(&settings).unwrap();
        assert_eq!(res[0].statistic, "10,900");
        let labelled = fs::read(settings.out_dir.join("figure-1.png")).unwrap();
        assert_ne!(plain, labelled);
        assert_eq!(image_streams(&settings.out_dir.join("question-1.pdf")).len(), 1);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let row = |question: u32, vote: &str| SurveyRow {
            question,
            vote: VoteValue::parse(vote),
            title: format!("Q{}", question),
        };
        let groups = group_by_question(vec![row(5, "1"), row(2, "2"), row(5, "3")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].number, 5);
        assert_eq!(groups[0].votes.len(), 2);
        assert_eq!(groups[1].number, 2);
    }

    #[test]
    fn title_fallbacks() {
        let group = QuestionGroup {
            number: 4,
            title: " ".to_string(),
            votes: vec![],
        };
        assert_eq!(page_title(&group, Some("Prompt")), "Prompt");
        assert_eq!(page_title(&group, None), "Question 4");
    }
}
