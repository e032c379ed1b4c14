// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// All the possible states of a vote, as exported by the survey tool.
///
/// Only `Number` takes part in the statistics. Booleans and free text are
/// kept so that they can be counted, but they are not numeric votes.
#[derive(PartialEq, Debug, Clone)]
pub enum VoteValue {
    /// A numeric answer. Always finite.
    Number(f64),
    /// A `Yes` / `No` answer.
    Flag(bool),
    /// Any other answer.
    Text(String),
    /// The voter did not answer (`-` or an empty cell).
    Missing,
}

impl VoteValue {
    /// Decodes the raw content of a vote cell.
    ///
    /// ```
    /// use vote_summary::VoteValue;
    ///
    /// assert_eq!(VoteValue::parse(" 1,250 "), VoteValue::Number(1250.0));
    /// assert_eq!(VoteValue::parse("Yes"), VoteValue::Flag(true));
    /// assert_eq!(VoteValue::parse("-"), VoteValue::Missing);
    /// assert_eq!(VoteValue::parse("Paris"), VoteValue::Text("Paris".to_string()));
    /// ```
    pub fn parse(raw: &str) -> VoteValue {
        let s = raw.trim();
        if s.is_empty() || s == "-" {
            return VoteValue::Missing;
        }
        if s.eq_ignore_ascii_case("yes") {
            return VoteValue::Flag(true);
        }
        if s.eq_ignore_ascii_case("no") {
            return VoteValue::Flag(false);
        }
        match strip_thousands(s).and_then(|n| n.parse::<f64>().ok()) {
            Some(x) if x.is_finite() => VoteValue::Number(x),
            _ => VoteValue::Text(s.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            VoteValue::Number(x) => Some(*x),
            _ => None,
        }
    }
}

// Removes the thousands separators of a number, if they are well placed.
// "12,500.5" -> "12500.5", "1,2" -> None
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let unsigned = int_part
        .strip_prefix('-')
        .or_else(|| int_part.strip_prefix('+'))
        .unwrap_or(int_part);
    fn all_digits(g: &str) -> bool {
        g.chars().all(|c| c.is_ascii_digit())
    }
    let groups: Vec<&str> = unsigned.split(',').collect();
    let first_ok = matches!(groups.first(), Some(g) if !g.is_empty() && g.len() <= 3 && all_digits(g));
    let rest_ok = groups.iter().skip(1).all(|g| g.len() == 3 && all_digits(g));
    if !(first_ok && rest_ok) {
        return None;
    }
    let mut res: String = int_part.chars().filter(|c| *c != ',').collect();
    if let Some(f) = frac_part {
        res.push('.');
        res.push_str(f);
    }
    Some(res)
}

// ********* Configuration **********

/// The fraction of votes removed from each tail before averaging.
///
/// Guaranteed to be in `[0, 1)` at construction.
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub struct TrimFraction(f64);

impl TrimFraction {
    pub const NONE: TrimFraction = TrimFraction(0.0);

    pub fn new(fraction: f64) -> Result<TrimFraction, SummaryError> {
        if (0.0..1.0).contains(&fraction) {
            Ok(TrimFraction(fraction))
        } else {
            Err(SummaryError::InvalidTrim(fraction))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for TrimFraction {
    fn default() -> Self {
        TrimFraction::NONE
    }
}

// ******** Output data structures *********

/// Statistics for one question
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionStats {
    /// All the votes, including the missing ones.
    pub total: usize,
    /// The votes with a numeric value.
    pub numeric: usize,
    /// The number of values removed from each tail.
    pub trimmed: usize,
    /// The number of values averaged.
    pub kept: usize,
    /// The trimmed mean. None when no vote is numeric.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Errors that prevent a summary from being computed.
#[derive(PartialEq, Debug, Clone)]
pub enum SummaryError {
    InvalidTrim(f64),
}

impl Error for SummaryError {}

impl Display for SummaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryError::InvalidTrim(x) => {
                write!(f, "trim fraction must be in [0, 1), got {}", x)
            }
        }
    }
}
