//! Grouping of spans into lines and lines into blocks.
//!
//! Coordinates here are page-local with a top-left origin.

use super::content::{PageContent, TextSpan};
use super::document::PageGeometry;
use crate::model::BBox;

// Approximate ascender/descender as fractions of the font size
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// A span placed on the page.
#[derive(Debug, Clone)]
pub struct PlacedSpan {
    pub span: TextSpan,
    /// Left edge
    pub x: f32,
    /// Baseline, measured from the top of the page
    pub baseline: f32,
}

impl PlacedSpan {
    fn new(span: TextSpan, geometry: &PageGeometry) -> Self {
        let (x, baseline) = geometry.to_top_left(span.x, span.y);
        Self { span, x, baseline }
    }

    pub fn right(&self) -> f32 {
        self.x + self.span.width
    }

    pub fn top(&self) -> f32 {
        self.baseline - self.span.font_size * ASCENT
    }

    pub fn bottom(&self) -> f32 {
        self.baseline + self.span.font_size * DESCENT
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub spans: Vec<PlacedSpan>,
}

impl TextLine {
    fn baseline(&self) -> f32 {
        self.spans.first().map_or(0.0, |s| s.baseline)
    }

    fn left(&self) -> f32 {
        self.spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min)
    }

    fn right(&self) -> f32 {
        self.spans
            .iter()
            .map(|s| s.right())
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Average span size weighted by text length.
    fn font_size(&self) -> f32 {
        let total: usize = self.spans.iter().map(|s| s.span.text.len()).sum();
        if total == 0 {
            return self.spans.first().map_or(0.0, |s| s.span.font_size);
        }
        self.spans
            .iter()
            .map(|s| s.span.font_size * s.span.text.len() as f32)
            .sum::<f32>()
            / total as f32
    }

    fn accepts(&self, span: &PlacedSpan) -> bool {
        let Some(last) = self.spans.last() else {
            return true;
        };
        let size = last.span.font_size.max(span.span.font_size).max(1.0);
        let same_baseline = (last.baseline - span.baseline).abs() <= size * 0.3;
        let gap = span.x - self.right();
        same_baseline && gap > -size && gap < size * 2.0
    }
}

/// A text block: consecutive lines with uniform spacing, size and indent.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// All spans in reading order.
    pub fn spans(&self) -> impl Iterator<Item = &PlacedSpan> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Span texts joined with single spaces.
    pub fn text(&self) -> String {
        self.spans()
            .map(|s| s.span.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The first span, whose style represents the block.
    pub fn first_span(&self) -> Option<&PlacedSpan> {
        self.spans().next()
    }

    /// Union of the span boxes.
    ///
    /// Zero-width spans have no box and do not widen the block.
    pub fn bbox(&self) -> Option<BBox> {
        self.spans()
            .filter_map(|s| BBox::new(s.x, s.top(), s.right(), s.bottom()))
            .reduce(|acc, b| acc.union(&b))
    }
}

/// A top-level block of a page.
#[derive(Debug, Clone)]
pub enum PageBlock {
    Text(TextBlock),
    Image(BBox),
}

impl PageBlock {
    fn sort_key(&self) -> (f32, f32) {
        match self {
            PageBlock::Text(block) => block
                .bbox()
                .map_or((0.0, 0.0), |b| (b.y_min(), b.x_min())),
            PageBlock::Image(bbox) => (bbox.y_min(), bbox.x_min()),
        }
    }
}

/// Build the page's blocks in top-to-bottom, left-to-right order.
pub fn build_blocks(content: PageContent, geometry: &PageGeometry) -> Vec<PageBlock> {
    let mut blocks: Vec<PageBlock> = Vec::new();

    for image in &content.images {
        let (x0, y0) = geometry.to_top_left(image.x_min, image.y_max);
        let (x1, y1) = geometry.to_top_left(image.x_max, image.y_min);
        match BBox::new(x0, y0, x1, y1).and_then(|b| b.clamp_to(geometry.width, geometry.height)) {
            Some(bbox) => blocks.push(PageBlock::Image(bbox)),
            None => log::debug!("Skipping off-page image /{}", image.name),
        }
    }

    let spans: Vec<PlacedSpan> = content
        .spans
        .into_iter()
        .map(|s| PlacedSpan::new(s, geometry))
        .collect();
    let lines = group_spans_into_lines(spans);
    blocks.extend(
        group_lines_into_blocks(lines)
            .into_iter()
            .map(PageBlock::Text),
    );

    blocks.sort_by(|a, b| {
        let (ay, ax) = a.sort_key();
        let (by, bx) = b.sort_key();
        ay.total_cmp(&by).then(ax.total_cmp(&bx))
    });
    blocks
}

/// Join consecutive spans on the same baseline into lines.
fn group_spans_into_lines(spans: Vec<PlacedSpan>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some(line) if line.accepts(&span) => line.spans.push(span),
            _ => lines.push(TextLine { spans: vec![span] }),
        }
    }
    for line in &mut lines {
        line.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

fn avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| w[1].baseline() - w[0].baseline())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = curr.baseline() - prev.baseline();
    // moving back up the page starts a new column or region
    if spacing <= 0.0 {
        return true;
    }
    if spacing > avg_spacing * 1.5 {
        return true;
    }
    if (prev.font_size() - curr.font_size()).abs() > 1.0 {
        return true;
    }
    (prev.left() - curr.left()).abs() > 20.0
}

/// Split lines into blocks on spacing, size and indentation changes.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = avg_line_spacing(&lines);
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }
    blocks
}
