//! Content-stream interpretation.
//!
//! Walks a page's operators tracking the graphics and text state and emits
//! positioned text spans and image placements in PDF user space.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::document::{get_number, stream_bytes, PdfDocument};
use crate::error::{Error, Result};
use crate::style::pack_rgb;

/// Span flag: italic font.
pub const FLAG_ITALIC: u32 = 2;
/// Span flag: bold font.
pub const FLAG_BOLD: u32 = 4;

// FontDescriptor /Flags bits
const DESCRIPTOR_ITALIC: i64 = 1 << 6;
const DESCRIPTOR_FORCE_BOLD: i64 = 1 << 18;

const MAX_FORM_DEPTH: usize = 8;
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let v: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        (v.len() == 6).then(|| Matrix {
            a: v[0],
            b: v[1],
            c: v[2],
            d: v[3],
            e: v[4],
            f: v[5],
        })
    }

    /// `self` followed by `other` (PDF's `self × other`).
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit y vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// A run of text shown by one text-showing operator.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Decoded text
    pub text: String,
    /// Baseline origin X in user space
    pub x: f32,
    /// Baseline origin Y in user space
    pub y: f32,
    /// Advance width in user space
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// `FLAG_ITALIC` / `FLAG_BOLD` bits
    pub flags: u32,
    /// Fill color packed as `0xRRGGBB`
    pub color: u32,
}

/// An image XObject painted on the page.
#[derive(Debug, Clone)]
pub struct ImagePlacement {
    /// Resource name of the XObject
    pub name: String,
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// Everything painted on a page that the layout engine cares about.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub spans: Vec<TextSpan>,
    pub images: Vec<ImagePlacement>,
}

/// Interpret the content of a page (0-indexed).
pub fn interpret_page(pdf: &PdfDocument, index: usize) -> Result<PageContent> {
    let page_id = pdf.page_id(index)?;
    let content = pdf.page_content(page_id)?;
    let mut interpreter = Interpreter {
        pdf,
        out: PageContent::default(),
    };
    let resources = pdf.page_resources(page_id);
    interpreter.run(&content, resources, GraphicsState::default(), 0)?;
    Ok(interpreter.out)
}

/// Font properties needed for layout.
#[derive(Debug, Clone)]
struct FontInfo<'a> {
    base_font: String,
    flags: u32,
    first_char: i64,
    widths: Vec<f32>,
    missing_width: f32,
    two_byte: bool,
    dict: &'a Dictionary,
}

impl FontInfo<'_> {
    fn glyph_width(&self, code: u32) -> f32 {
        let idx = code as i64 - self.first_char;
        if idx >= 0 {
            if let Some(w) = self.widths.get(idx as usize) {
                return *w;
            }
        }
        self.missing_width
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: u32,
    font: Option<Vec<u8>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: 0x000000,
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

struct Interpreter<'a> {
    pdf: &'a PdfDocument,
    out: PageContent,
}

impl<'a> Interpreter<'a> {
    fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;
        let fonts = self.load_fonts(resources);

        let mut state = initial;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;
        let mut in_text = false;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(color) = color_from_operands(operands) {
                        state.fill = color;
                    }
                }
                "BT" => {
                    in_text = true;
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "ET" => in_text = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            state.font = Some(name.clone());
                        }
                        state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "Tc" => state.char_spacing = first_number(operands).unwrap_or(0.0),
                "Tw" => state.word_spacing = first_number(operands).unwrap_or(0.0),
                "Tz" => state.h_scale = first_number(operands).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = first_number(operands).unwrap_or(0.0),
                "Ts" => state.rise = first_number(operands).unwrap_or(0.0),
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).then(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix = Matrix::translation(0.0, -state.leading).then(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        if op.operator == "\"" && operands.len() >= 3 {
                            state.word_spacing = get_number(&operands[0]).unwrap_or(0.0);
                            state.char_spacing = get_number(&operands[1]).unwrap_or(0.0);
                        }
                        line_matrix = Matrix::translation(0.0, -state.leading).then(&line_matrix);
                        text_matrix = line_matrix;
                    }
                    if !in_text {
                        continue;
                    }
                    let font = state.font.as_ref().and_then(|n| fonts.get(n));
                    let items: Vec<&Object> = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(arr)) => arr.iter().collect(),
                            _ => Vec::new(),
                        },
                        "\"" => operands.get(2).into_iter().collect(),
                        _ => operands.first().into_iter().collect(),
                    };
                    self.show_text(&items, font, &state, &mut text_matrix);
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.paint_xobject(name, resources, &state, depth);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn load_fonts(&self, resources: Option<&'a Dictionary>) -> HashMap<Vec<u8>, FontInfo<'a>> {
        let mut fonts = HashMap::new();
        let Some(font_dict) = resources
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|o| self.pdf.resolve_dict(o))
        else {
            return fonts;
        };

        for (name, obj) in font_dict.iter() {
            if let Some(dict) = self.pdf.resolve_dict(obj) {
                fonts.insert(name.clone(), self.font_info(dict));
            }
        }
        fonts
    }

    fn font_info(&self, dict: &'a Dictionary) -> FontInfo<'a> {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| self.pdf.resolve(o).as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let two_byte = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        // Type0 fonts keep their descriptor on the descendant font
        let descendant = if two_byte {
            dict.get(b"DescendantFonts")
                .ok()
                .and_then(|o| self.pdf.resolve(o).as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| self.pdf.resolve_dict(o))
        } else {
            None
        };
        let descriptor = descendant
            .unwrap_or(dict)
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.pdf.resolve_dict(o));

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.pdf.resolve(o).as_i64().ok())
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| self.pdf.resolve(o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| get_number(self.pdf.resolve(o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = if two_byte {
            descendant
                .and_then(|d| d.get(b"DW").ok())
                .and_then(get_number)
                .unwrap_or(1000.0)
        } else {
            descriptor
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(get_number)
                .filter(|w| *w > 0.0)
                .unwrap_or(DEFAULT_GLYPH_WIDTH)
        };

        let flags = font_flags(&base_font, descriptor);
        FontInfo {
            base_font,
            flags,
            first_char,
            widths,
            missing_width,
            two_byte,
            dict,
        }
    }

    fn decode(&self, font: Option<&FontInfo<'a>>, bytes: &[u8]) -> String {
        if let Some(font) = font {
            if let Ok(encoding) = font.dict.get_font_encoding(self.pdf.inner()) {
                if let Ok(decoded) = LopdfDocument::decode_text(&encoding, bytes) {
                    return decoded;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Emit one span for a text-showing operator and advance the text matrix.
    fn show_text(
        &mut self,
        items: &[&Object],
        font: Option<&FontInfo<'a>>,
        state: &GraphicsState,
        text_matrix: &mut Matrix,
    ) {
        let start = text_matrix.then(&state.ctm);
        let mut text = String::new();

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    text.push_str(&self.decode(font, bytes));
                    let advance = text_advance(bytes, font, state);
                    *text_matrix = Matrix::translation(advance, 0.0).then(text_matrix);
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    let tx = adjustment / 1000.0 * state.font_size * state.h_scale;
                    *text_matrix = Matrix::translation(tx, 0.0).then(text_matrix);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                    {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        if text.trim().is_empty() {
            return;
        }

        let (x, y) = start.apply(0.0, state.rise);
        let end = text_matrix.then(&state.ctm);
        let (ex, ey) = end.apply(0.0, state.rise);
        let width = ((ex - x).powi(2) + (ey - y).powi(2)).sqrt();
        let font_size = state.font_size.abs() * start.vertical_scale();

        let (font_name, flags) = match font {
            Some(f) => (f.base_font.clone(), f.flags),
            None => (
                state
                    .font
                    .as_ref()
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                0,
            ),
        };

        self.out.spans.push(TextSpan {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            flags,
            color: state.fill,
        });
    }

    fn paint_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
        depth: usize,
    ) {
        let Some(xobject) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| self.pdf.resolve_dict(o))
            .and_then(|d| d.get(name).ok())
            .map(|o| self.pdf.resolve(o))
        else {
            log::debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return;
        };
        let Object::Stream(stream) = xobject else {
            return;
        };

        match stream.dict.get(b"Subtype").and_then(|o| o.as_name()) {
            Ok(b"Image") => {
                let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
                    .map(|(x, y)| state.ctm.apply(x, y));
                let xs = corners.map(|c| c.0);
                let ys = corners.map(|c| c.1);
                self.out.images.push(ImagePlacement {
                    name: String::from_utf8_lossy(name).to_string(),
                    x_min: xs.iter().copied().fold(f32::INFINITY, f32::min),
                    y_min: ys.iter().copied().fold(f32::INFINITY, f32::min),
                    x_max: xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                    y_max: ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                });
            }
            Ok(b"Form") => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("Form XObject nesting too deep, skipping");
                    return;
                }
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| Matrix::from_operands(arr))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| self.pdf.resolve_dict(o))
                    .or(resources);
                let mut form_state = state.clone();
                form_state.ctm = matrix.then(&state.ctm);

                let result = stream_bytes(stream)
                    .and_then(|bytes| self.run(&bytes, form_resources, form_state, depth + 1));
                if let Err(e) = result {
                    log::warn!(
                        "Failed to interpret form XObject /{}: {}",
                        String::from_utf8_lossy(name),
                        e
                    );
                }
            }
            _ => {}
        }
    }
}

/// Horizontal displacement of a shown string in text space.
fn text_advance(bytes: &[u8], font: Option<&FontInfo<'_>>, state: &GraphicsState) -> f32 {
    let size = state.font_size;
    let mut total = 0.0;
    match font {
        Some(f) if f.two_byte => {
            for _ in bytes.chunks(2) {
                total += f.missing_width / 1000.0 * size + state.char_spacing;
            }
        }
        _ => {
            for &code in bytes {
                let w = font.map_or(DEFAULT_GLYPH_WIDTH, |f| f.glyph_width(code as u32));
                total += w / 1000.0 * size + state.char_spacing;
                if code == b' ' {
                    total += state.word_spacing;
                }
            }
        }
    }
    total * state.h_scale
}

/// Italic/bold flags from the font descriptor and the font name.
fn font_flags(base_font: &str, descriptor: Option<&Dictionary>) -> u32 {
    let lower = base_font.to_lowercase();
    let mut flags = 0;

    if lower.contains("italic") || lower.contains("oblique") {
        flags |= FLAG_ITALIC;
    }
    if lower.contains("bold") || lower.contains("black") || lower.contains("heavy") {
        flags |= FLAG_BOLD;
    }

    if let Some(desc) = descriptor {
        let descriptor_flags = desc
            .get(b"Flags")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        if descriptor_flags & DESCRIPTOR_ITALIC != 0 {
            flags |= FLAG_ITALIC;
        }
        if descriptor_flags & DESCRIPTOR_FORCE_BOLD != 0 {
            flags |= FLAG_BOLD;
        }
        let italic_angle = desc.get(b"ItalicAngle").ok().and_then(get_number);
        if italic_angle.is_some_and(|a| a.abs() > 0.5) {
            flags |= FLAG_ITALIC;
        }
        let weight = desc.get(b"FontWeight").ok().and_then(get_number);
        if weight.is_some_and(|w| w >= 600.0) {
            flags |= FLAG_BOLD;
        }
    }

    flags
}

/// Fill color from `g`/`rg`/`k`/`sc`/`scn` operands, by component count.
fn color_from_operands(operands: &[Object]) -> Option<u32> {
    let values: Vec<f32> = operands.iter().filter_map(get_number).collect();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    match values.len() {
        1 => {
            let g = channel(values[0]);
            Some(pack_rgb(g, g, g))
        }
        3 => Some(pack_rgb(
            channel(values[0]),
            channel(values[1]),
            channel(values[2]),
        )),
        4 => {
            let k = 1.0 - values[3].clamp(0.0, 1.0);
            Some(pack_rgb(
                channel((1.0 - values[0].clamp(0.0, 1.0)) * k),
                channel((1.0 - values[1].clamp(0.0, 1.0)) * k),
                channel((1.0 - values[2].clamp(0.0, 1.0)) * k),
            ))
        }
        _ => None,
    }
}

fn first_number(operands: &[Object]) -> Option<f32> {
    operands.first().and_then(get_number)
}

/// Decoding fallback when a font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
