// Layout of the report pages.
//
// All the coordinates are in points, from the bottom left corner of a US letter page.

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use snafu::prelude::*;

use crate::report::chart::ChartImage;
use crate::report::font_metrics::{encode_win_ansi, fit_size, wrap_text, StandardFont};
use crate::report::*;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;

const TITLE_TOP: f32 = 756.0;
// (font size, maximum number of lines)
const TITLE_SIZES: [(f32, usize); 2] = [(22.0, 2), (16.0, 3)];

const CHART_X: f32 = 56.0;
const CHART_Y: f32 = 300.0;
const CHART_W: f32 = 500.0;
const CHART_H: f32 = 400.0;
const IMAGE_NAME: &str = "Im1";

const DIVIDER_X: f32 = PAGE_WIDTH / 2.0;
const DIVIDER_BOTTOM: f32 = 70.0;
const DIVIDER_TOP: f32 = 270.0;
const CAPTION_Y: f32 = 245.0;
const CAPTION_SIZE: f32 = 14.0;
const VALUE_Y: f32 = 160.0;
const VALUE_SIZE: f32 = 48.0;
const REGION_PADDING: f32 = 30.0;

pub const CROWD_CAPTION: &str = "Crowd answer";
pub const ANSWER_CAPTION: &str = "Correct answer";

/// Everything displayed on the page of one question.
#[derive(PartialEq, Debug, Clone)]
pub struct PageContent<'a> {
    pub title: &'a str,
    pub chart: &'a ChartImage,
    pub statistic: &'a str,
    pub answer: Option<&'a str>,
}

fn pdf_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::PdfEncode {
        message: e.to_string(),
    }
}

fn real(x: f32) -> Object {
    Object::Real(x)
}

fn push_text(
    ops: &mut Vec<Operation>,
    font: StandardFont,
    size: f32,
    x: f32,
    y: f32,
    encoded: Vec<u8>,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(font.resource_name().as_bytes().to_vec()),
            real(size),
        ],
    ));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(encoded)]));
    ops.push(Operation::new("ET", vec![]));
}

fn push_centered_text(
    ops: &mut Vec<Operation>,
    text: &str,
    font: StandardFont,
    size: f32,
    center_x: f32,
    y: f32,
) {
    let encoded = encode_win_ansi(text);
    let width = font.text_width(&encoded, size);
    push_text(ops, font, size, center_x - width / 2.0, y, encoded);
}

// Picks the largest title size at which the title fits, and cuts it otherwise.
fn title_lines(title: &str) -> (f32, Vec<String>) {
    let max_width = PAGE_WIDTH - 2.0 * MARGIN;
    let mut res = (0.0, Vec::new());
    for (size, max_lines) in TITLE_SIZES {
        let mut lines = wrap_text(title, StandardFont::HelveticaBold, size, max_width);
        if lines.len() <= max_lines {
            return (size, lines);
        }
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str(" ...");
        }
        res = (size, lines);
    }
    res
}

fn push_title(ops: &mut Vec<Operation>, title: &str) {
    let (size, lines) = title_lines(title);
    debug!("push_title: size {} lines {:?}", size, lines);
    for (idx, line) in lines.iter().enumerate() {
        let y = TITLE_TOP - size - (idx as f32) * size * 1.2;
        push_centered_text(
            ops,
            line,
            StandardFont::HelveticaBold,
            fit_size(line, StandardFont::HelveticaBold, size, PAGE_WIDTH - 2.0 * MARGIN),
            PAGE_WIDTH / 2.0,
            y,
        );
    }
}

fn push_chart(ops: &mut Vec<Operation>) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            real(CHART_W),
            real(0.0),
            real(0.0),
            real(CHART_H),
            real(CHART_X),
            real(CHART_Y),
        ],
    ));
    ops.push(Operation::new(
        "Do",
        vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())],
    ));
    ops.push(Operation::new("Q", vec![]));
}

// A caption and a large value, centered in a region.
fn push_region(ops: &mut Vec<Operation>, caption: &str, value: &str, center_x: f32, width: f32) {
    push_centered_text(
        ops,
        caption,
        StandardFont::Helvetica,
        CAPTION_SIZE,
        center_x,
        CAPTION_Y,
    );
    let size = fit_size(value, StandardFont::HelveticaBold, VALUE_SIZE, width);
    push_centered_text(
        ops,
        value,
        StandardFont::HelveticaBold,
        size,
        center_x,
        VALUE_Y,
    );
}

fn push_divider(ops: &mut Vec<Operation>) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("G", vec![real(0.6)]));
    ops.push(Operation::new("w", vec![real(1.0)]));
    ops.push(Operation::new("m", vec![real(DIVIDER_X), real(DIVIDER_BOTTOM)]));
    ops.push(Operation::new("l", vec![real(DIVIDER_X), real(DIVIDER_TOP)]));
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn image_stream(chart: &ChartImage) -> ReportResult<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&chart.rgb).context(CompressingSnafu {})?;
    let data = encoder.finish().context(CompressingSnafu {})?;
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => chart.width as i64,
        "Height" => chart.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data))
}

fn font_dict(font: StandardFont) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Lays out the page of one question and returns the bytes of the PDF document.
///
/// The title is centered at the top, the chart below it. At the bottom, the statistic is
/// displayed alone, or next to the correct answer with a vertical line in between.
pub fn compose_page(content: &PageContent) -> ReportResult<Vec<u8>> {
    let mut ops: Vec<Operation> = Vec::new();
    ops.push(Operation::new("g", vec![real(0.0)]));
    push_title(&mut ops, content.title);
    push_chart(&mut ops);
    match content.answer {
        Some(answer) => {
            let region_width = DIVIDER_X - MARGIN - 2.0 * REGION_PADDING;
            push_region(
                &mut ops,
                CROWD_CAPTION,
                content.statistic,
                (MARGIN + DIVIDER_X) / 2.0,
                region_width,
            );
            push_divider(&mut ops);
            push_region(
                &mut ops,
                ANSWER_CAPTION,
                answer,
                (DIVIDER_X + PAGE_WIDTH - MARGIN) / 2.0,
                region_width,
            );
        }
        None => {
            push_region(
                &mut ops,
                CROWD_CAPTION,
                content.statistic,
                PAGE_WIDTH / 2.0,
                PAGE_WIDTH - 2.0 * MARGIN,
            );
        }
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dict(StandardFont::Helvetica));
    let bold_id = doc.add_object(font_dict(StandardFont::HelveticaBold));
    let image_id = doc.add_object(image_stream(content.chart)?);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            StandardFont::Helvetica.resource_name() => regular_id,
            StandardFont::HelveticaBold.resource_name() => bold_id,
        },
        "XObject" => dictionary! {
            IMAGE_NAME => image_id,
        },
    });
    let encoded = Content { operations: ops }.encode().map_err(pdf_error)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::from(page_id)],
        "Count" => 1_i64,
        "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut res: Vec<u8> = Vec::new();
    doc.save_to(&mut res).map_err(pdf_error)?;
    Ok(res)
}

pub fn write_page(path: &Path, bytes: &[u8]) -> ReportResult<()> {
    fs::write(path, bytes).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::placeholder;

    fn operations(bytes: &[u8]) -> Vec<Operation> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.get(&1).unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content).unwrap().operations
    }

    fn texts(ops: &[Operation]) -> Vec<Vec<u8>> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(s, _)) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn statistic_alone() {
        let chart = placeholder(None).unwrap();
        let bytes = compose_page(&PageContent {
            title: "How many beans are in the jar?",
            chart: &chart,
            statistic: "1,350",
            answer: None,
        })
        .unwrap();
        let ops = operations(&bytes);
        let ts = texts(&ops);
        assert!(ts.contains(&b"How many beans are in the jar?".to_vec()));
        assert!(ts.contains(&b"1,350".to_vec()));
        assert!(ts.contains(&CROWD_CAPTION.as_bytes().to_vec()));
        assert!(!ts.contains(&ANSWER_CAPTION.as_bytes().to_vec()));
        assert!(ops.iter().any(|op| op.operator == "Do"));
        assert!(!ops.iter().any(|op| op.operator == "l"));
    }

    #[test]
    fn statistic_and_answer() {
        let chart = placeholder(None).unwrap();
        let bytes = compose_page(&PageContent {
            title: "Beans",
            chart: &chart,
            statistic: "1,350",
            answer: Some("1,402"),
        })
        .unwrap();
        let ops = operations(&bytes);
        let ts = texts(&ops);
        assert!(ts.contains(&b"1,402".to_vec()));
        assert!(ts.contains(&ANSWER_CAPTION.as_bytes().to_vec()));
        assert_eq!(ops.iter().filter(|op| op.operator == "l").count(), 1);
    }

    #[test]
    fn same_input_same_bytes() {
        let chart = placeholder(None).unwrap();
        let content = PageContent {
            title: "Beans",
            chart: &chart,
            statistic: "NaN",
            answer: None,
        };
        assert_eq!(compose_page(&content).unwrap(), compose_page(&content).unwrap());
    }

    #[test]
    fn long_titles() {
        let (size, lines) = title_lines("Short");
        assert_eq!((size, lines.len()), (22.0, 1));
        let long = "word ".repeat(80);
        let (size, lines) = title_lines(&long);
        assert_eq!(size, 16.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("..."));
    }
}
