use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use vote_summary::TrimFraction;

use crate::args::Args;
use crate::report::chart::parse_chart_kind;
use crate::report::io_common::resolve_path;
use crate::report::*;

/// The settings that can be stored in a configuration file.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    pub trim: Option<f64>,
    #[serde(rename = "chartKind")]
    pub chart_kind: Option<String>,
    #[serde(rename = "answersFile")]
    pub answers_file: Option<String>,
    #[serde(rename = "fontFile")]
    pub font_file: Option<String>,
    #[serde(rename = "placeholderImage")]
    pub placeholder_image: Option<String>,
    #[serde(rename = "noCharts")]
    pub no_charts: Option<bool>,
}

impl ReportConfig {
    // Makes the paths of the file relative to the directory of the file.
    fn resolve_paths(self, base_dir: &Path) -> ReportConfig {
        let resolve = |p: Option<String>| p.map(|s| resolve_path(base_dir, &s).display().to_string());
        ReportConfig {
            output_directory: resolve(self.output_directory),
            answers_file: resolve(self.answers_file),
            font_file: resolve(self.font_file),
            placeholder_image: resolve(self.placeholder_image),
            ..self
        }
    }
}

pub fn read_config(path: &Path) -> ReportResult<ReportConfig> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_s.clone(),
    })?;
    let config: ReportConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path: path_s })?;
    debug!("read_config: {:?}", config);
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_paths(base_dir))
}

/// Merges the command line with the configuration file, if any.
/// The command line takes precedence.
pub fn build_settings(args: &Args) -> ReportResult<ReportSettings> {
    let config = match &args.config {
        Some(p) => read_config(Path::new(p))?,
        None => ReportConfig::default(),
    };
    merge_settings(args, config)
}

fn merge_settings(args: &Args, config: ReportConfig) -> ReportResult<ReportSettings> {
    let trim = TrimFraction::new(args.trim.or(config.trim).unwrap_or(0.0))
        .context(InvalidTrimSnafu {})?;
    let chart_kind = match args.chart.clone().or(config.chart_kind) {
        Some(s) => parse_chart_kind(&s)?,
        None => ChartKind::Box,
    };
    let to_path = |a: &Option<String>, c: Option<String>| a.clone().or(c).map(PathBuf::from);
    let mut settings = ReportSettings::new(PathBuf::from(&args.datafile));
    settings.trim = trim;
    settings.chart_kind = chart_kind;
    settings.no_charts = if args.charts {
        false
    } else {
        args.nocharts || config.no_charts.unwrap_or(false)
    };
    settings.answers_file = to_path(&args.answers, config.answers_file);
    settings.font_file = to_path(&args.font, config.font_file);
    settings.placeholder_image = to_path(&args.placeholder, config.placeholder_image);
    if let Some(out_dir) = to_path(&args.out_dir, config.output_directory) {
        settings.out_dir = out_dir;
    }
    settings.summary = args.summary.clone();
    settings.reference = args.reference.clone().map(PathBuf::from);
    Ok(settings)
}
