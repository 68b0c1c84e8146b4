//! PDF summary report.
//!
//! The report is a title, a heading and the summary table as monospace text,
//! paginated over A4 pages. Text uses the standard Type1 fonts, so only
//! Latin-1 characters can be shown; anything else is drawn as `?`.

use crate::error::{AutoStatError, Result};
use crate::profiler::SummaryTable;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Title drawn at the top of the first page.
pub const REPORT_TITLE: &str = "AutoStat AI - Report";

const SECTION_HEADING: &str = "Summary Statistics:";

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const TITLE_SIZE: i64 = 16;
const HEADING_SIZE: i64 = 12;
const BODY_SIZE: i64 = 10;
const LINE_HEIGHT: i64 = 12;

/// Characters per body line: Courier glyphs are 0.6 em wide.
pub const BODY_COLUMNS: usize = ((PAGE_WIDTH - 2 * MARGIN) * 10 / (BODY_SIZE * 6)) as usize;

/// Renders the summary table into a PDF document.
#[derive(Debug, Clone)]
pub struct PdfReport {
    title: String,
    lines: Vec<String>,
}

impl PdfReport {
    /// A report for a summary table, wrapped to the page width.
    pub fn from_summary(summary: &SummaryTable) -> Self {
        let text = summary.render_text(Some(BODY_COLUMNS));
        Self {
            title: REPORT_TITLE.to_string(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Body lines as they will be drawn.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Split the body over pages. The first page also carries the title and
    /// heading, so it holds fewer lines.
    fn paginate(&self) -> Vec<&[String]> {
        let first_top = PAGE_HEIGHT - MARGIN - 2 * TITLE_SIZE - 2 * HEADING_SIZE;
        let other_top = PAGE_HEIGHT - MARGIN;
        let first_capacity = ((first_top - BODY_SIZE - MARGIN) / LINE_HEIGHT + 1) as usize;
        let other_capacity = ((other_top - BODY_SIZE - MARGIN) / LINE_HEIGHT + 1) as usize;

        let split = first_capacity.min(self.lines.len());
        let (first, rest) = self.lines.split_at(split);

        let mut pages = vec![first];
        pages.extend(rest.chunks(other_capacity));
        pages
    }

    fn page_operations(&self, page_index: usize, lines: &[String]) -> Vec<Operation> {
        let mut operations = Vec::new();
        let mut top = PAGE_HEIGHT - MARGIN;

        if page_index == 0 {
            operations.extend(text_block("F1", TITLE_SIZE, MARGIN, top - TITLE_SIZE, &self.title));
            top -= 2 * TITLE_SIZE;
            operations.extend(text_block(
                "F1",
                HEADING_SIZE,
                MARGIN,
                top - HEADING_SIZE,
                SECTION_HEADING,
            ));
            top -= 2 * HEADING_SIZE;
        }

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F2".into(), BODY_SIZE.into()]));
        operations.push(Operation::new("TL", vec![LINE_HEIGHT.into()]));
        operations.push(Operation::new("Td", vec![MARGIN.into(), (top - BODY_SIZE).into()]));
        for line in lines {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_latin1(line))],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        operations
    }

    /// Render the document.
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let title_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let body_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => title_font_id,
                "F2" => body_font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (index, lines) in self.paginate().into_iter().enumerate() {
            let content = Content {
                operations: self.page_operations(index, lines),
            };
            let encoded = content
                .encode()
                .map_err(|e| AutoStatError::ReportGenerationFailed(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buf: Vec<u8> = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| AutoStatError::ReportGenerationFailed(e.to_string()))?;
        Ok(buf)
    }
}

fn text_block(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_latin1(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Latin-1 bytes of `text`, `?` for characters outside the range.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
