// The answers side file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::report::*;

/// The prompt and the correct answer of one question.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnswerReference {
    pub q: String,
    // Some files store the answer as a number.
    a: JSValue,
}

impl AnswerReference {
    pub fn answer_text(&self) -> String {
        match &self.a {
            JSValue::String(s) => s.clone(),
            JSValue::Null => "".to_string(),
            x => x.to_string(),
        }
    }
}

/// All the answers, keyed by question number.
#[derive(PartialEq, Debug, Clone)]
pub struct Answers {
    path: String,
    entries: HashMap<String, AnswerReference>,
}

impl Answers {
    pub fn lookup(&self, question: u32) -> ReportResult<&AnswerReference> {
        self.entries
            .get(&question.to_string())
            .context(MissingAnswerSnafu {
                question,
                path: self.path.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn read_answers(path: &Path) -> BReportResult<Answers> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_s.clone(),
    })?;
    let entries: HashMap<String, AnswerReference> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
            path: path_s.clone(),
        })?;
    debug!("read_answers: {} answers in {}", entries.len(), path_s);
    Ok(Answers {
        path: path_s,
        entries,
    })
}
