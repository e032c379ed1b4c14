// Charts of the distribution of the votes.
//
// Charts are drawn into an RGB buffer that is then saved as PNG and embedded in the page.

use std::fs;
use std::path::Path;

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snafu::prelude::*;

use vote_summary::VoteValue;

use crate::report::*;

pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 480;

const FONT_FAMILY: &str = "sans-serif";
const SWARM_JITTER: f32 = 0.35;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Box,
    Swarm,
}

pub fn parse_chart_kind(s: &str) -> ReportResult<ChartKind> {
    match s.trim().to_lowercase().as_str() {
        "box" => Ok(ChartKind::Box),
        "swarm" => Ok(ChartKind::Swarm),
        x => whatever!("Unknown chart type {:?}: expected 'box' or 'swarm'", x),
    }
}

/// An RGB image, 3 bytes per pixel, row by row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl ChartImage {
    pub fn save_png(&self, path: &Path) -> ReportResult<()> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.rgb.clone()).context(
            DrawingSnafu {
                message: "image buffer does not match its dimensions",
            },
        )?;
        img.save(path).context(ImageIoSnafu {
            path: path.display().to_string(),
        })
    }
}

fn drawing_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Drawing {
        message: e.to_string(),
    }
}

/// Registers the font used for all the text of the charts.
///
/// The font stays registered for the rest of the process.
pub fn register_font(path: &Path) -> ReportResult<()> {
    let path_s = path.display().to_string();
    let bytes = fs::read(path).context(FontReadSnafu {
        path: path_s.clone(),
    })?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
        ReportError::FontInvalid {
            path: path_s.clone(),
            message: "not a valid TrueType font".to_string(),
        }
    })?;
    info!("Registered chart font {}", path_s);
    Ok(())
}

/// The image used instead of a chart.
pub fn placeholder(path: Option<&Path>) -> ReportResult<ChartImage> {
    match path {
        None => Ok(ChartImage {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            rgb: vec![255; (CHART_WIDTH * CHART_HEIGHT * 3) as usize],
        }),
        Some(p) => {
            let img = image::open(p)
                .context(ImageIoSnafu {
                    path: p.display().to_string(),
                })?
                .to_rgb8();
            let img = if img.dimensions() == (CHART_WIDTH, CHART_HEIGHT) {
                img
            } else {
                debug!(
                    "placeholder: resizing {:?} from {:?}",
                    p,
                    img.dimensions()
                );
                image::imageops::resize(
                    &img,
                    CHART_WIDTH,
                    CHART_HEIGHT,
                    image::imageops::FilterType::Triangle,
                )
            };
            Ok(ChartImage {
                width: CHART_WIDTH,
                height: CHART_HEIGHT,
                rgb: img.into_raw(),
            })
        }
    }
}

// The vertical range of the chart, with some padding.
fn value_range(values: &[f64]) -> (f32, f32) {
    let lo = values.iter().cloned().reduce(f64::min);
    let hi = values.iter().cloned().reduce(f64::max);
    match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            ((lo - pad) as f32, (hi + pad) as f32)
        }
        (Some(x), Some(_)) => (x as f32 - 1.0, x as f32 + 1.0),
        _ => (0.0, 1.0),
    }
}

/// Draws the distribution of the numeric votes.
///
/// The text of the chart (`label` on the vertical axis and the ticks) is only drawn when a
/// label is given, which requires a registered font. The jitter of the swarm chart is
/// derived from `seed`, so the same votes always give the same image.
pub fn render_chart(
    votes: &[VoteValue],
    kind: ChartKind,
    label: Option<&str>,
    seed: u64,
) -> ReportResult<ChartImage> {
    let values: Vec<f64> = votes.iter().filter_map(|v| v.as_number()).collect();
    debug!(
        "render_chart: {:?} chart of {} values",
        kind,
        values.len()
    );
    let mut rgb = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut rgb, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;
        match kind {
            ChartKind::Box => draw_box(&root, &values, label)?,
            ChartKind::Swarm => draw_swarm(&root, &values, label, seed)?,
        }
        root.present().map_err(drawing_error)?;
    }
    Ok(ChartImage {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        rgb,
    })
}

fn draw_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    values: &[f64],
    label: Option<&str>,
) -> ReportResult<()> {
    let (lo, hi) = value_range(values);
    let categories = [label.unwrap_or("votes").to_string()];
    let label_area = if label.is_some() { 60 } else { 0 };
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(label_area / 2)
        .y_label_area_size(label_area)
        .build_cartesian_2d(categories[..].into_segmented(), lo..hi)
        .map_err(drawing_error)?;

    if let Some(l) = label {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(l)
            .axis_desc_style((FONT_FAMILY, 18))
            .label_style((FONT_FAMILY, 14))
            .draw()
            .map_err(drawing_error)?;
    }

    if !values.is_empty() {
        let quartiles = Quartiles::new(values);
        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(&categories[0]), &quartiles)
                    .width(120)
                    .whisker_width(0.5)
                    .style(BLUE.stroke_width(2)),
            ))
            .map_err(drawing_error)?;
    }
    Ok(())
}

fn draw_swarm<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    values: &[f64],
    label: Option<&str>,
    seed: u64,
) -> ReportResult<()> {
    let (lo, hi) = value_range(values);
    let label_area = if label.is_some() { 60 } else { 0 };
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(label_area / 2)
        .y_label_area_size(label_area)
        .build_cartesian_2d(-1f32..1f32, lo..hi)
        .map_err(drawing_error)?;

    if let Some(l) = label {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc(l)
            .axis_desc_style((FONT_FAMILY, 18))
            .label_style((FONT_FAMILY, 14))
            .draw()
            .map_err(drawing_error)?;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f32, f32)> = values
        .iter()
        .map(|v| (rng.gen_range(-SWARM_JITTER..SWARM_JITTER), *v as f32))
        .collect();
    chart
        .draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 5, BLUE.mix(0.6).filled())),
        )
        .map_err(drawing_error)?;
    Ok(())
}
