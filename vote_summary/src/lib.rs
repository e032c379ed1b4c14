/*!
Summaries of crowd-voting survey answers.

Each question of a survey gets one number: the trimmed mean of the numeric
votes, floored and formatted for display. See the [manual] for the input
conventions.

```
use vote_summary::*;

let votes: Vec<VoteValue> = ["10", "12", "-", "1,000", "11"]
    .iter()
    .map(|s| VoteValue::parse(s))
    .collect();
let trim = TrimFraction::new(0.2)?;
let stats = summarize(&votes, trim);
assert_eq!(stats.kept, 2);
assert_eq!(format_statistic(stats.mean), "11");
# Ok::<(), SummaryError>(())
```
*/

mod config;
pub mod manual;

use log::{debug, info};

pub use crate::config::*;

/// The sentinel displayed when a question has no numeric vote.
pub const NAN_STATISTIC: &str = "NaN";

/// The number of values removed from each tail of `n` sorted values.
///
/// As soon as some trimming is requested, at least one value is removed on
/// each side, as long as one value remains in the middle.
pub fn trim_count(n: usize, trim: TrimFraction) -> usize {
    if n == 0 || trim.is_none() {
        return 0;
    }
    let requested = ((n as f64) * trim.value()).floor() as usize;
    let max_allowed = (n - 1) / 2;
    let res = requested.max(1).min(max_allowed);
    debug!(
        "trim_count: n: {} trim: {} requested: {} -> {}",
        n,
        trim.value(),
        requested,
        res
    );
    res
}

/// The values left after trimming, in ascending order.
pub fn trimmed_values(values: &[f64], trim: TrimFraction) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let k = trim_count(sorted.len(), trim);
    sorted[k..sorted.len() - k].to_vec()
}

fn numeric_votes(votes: &[VoteValue]) -> Vec<f64> {
    votes.iter().filter_map(|v| v.as_number()).collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        // The sum of very large votes can overflow even when their mean does not.
        Some(values.iter().map(|x| x / n).sum())
    }
}

/// The mean of the numeric votes after trimming.
///
/// Missing and non-numeric votes are ignored. Returns None if no vote is
/// numeric.
pub fn trimmed_mean(votes: &[VoteValue], trim: TrimFraction) -> Option<f64> {
    mean(&trimmed_values(&numeric_votes(votes), trim))
}

/// Computes all the statistics of a question.
pub fn summarize(votes: &[VoteValue], trim: TrimFraction) -> QuestionStats {
    let values = numeric_votes(votes);
    let kept = trimmed_values(&values, trim);
    let res = QuestionStats {
        total: votes.len(),
        numeric: values.len(),
        trimmed: trim_count(values.len(), trim),
        kept: kept.len(),
        mean: mean(&kept),
        min: values.iter().cloned().reduce(f64::min),
        max: values.iter().cloned().reduce(f64::max),
    };
    info!(
        "summarize: {} votes, {} numeric, {} kept, mean: {:?}",
        res.total, res.numeric, res.kept, res.mean
    );
    res
}

/// The text displayed for a mean: floored, with thousands separators.
///
/// A mean that is not a finite number is displayed like a missing one.
///
/// ```
/// use vote_summary::format_statistic;
///
/// assert_eq!(format_statistic(Some(1234567.89)), "1,234,567");
/// assert_eq!(format_statistic(Some(-0.5)), "-1");
/// assert_eq!(format_statistic(None), "NaN");
/// assert_eq!(format_statistic(Some(f64::INFINITY)), "NaN");
/// ```
pub fn format_statistic(mean: Option<f64>) -> String {
    match mean {
        // Adding 0.0 turns -0.0 into 0.0.
        Some(x) if x.is_finite() => group_digits(&format!("{:.0}", x.floor() + 0.0)),
        _ => NAN_STATISTIC.to_string(),
    }
}

pub fn format_thousands(value: i64) -> String {
    group_digits(&value.to_string())
}

// "-1234567" -> "-1,234,567"
fn group_digits(number: &str) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", number),
    };
    let mut res = String::with_capacity(number.len() + digits.len() / 3);
    res.push_str(sign);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}
