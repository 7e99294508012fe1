//! Raster extraction for scanned PDFs.
//!
//! A scanned page is usually one full-page image XObject. The largest image on
//! the first page is decoded so the vision engine can process it.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, Stream};

use super::document::{stream_bytes, PdfDocument};
use crate::error::{Error, Result};

/// Decode the largest image on the first page.
///
/// Returns `None` when the page has no image that can be decoded.
pub fn first_page_raster(pdf: &PdfDocument) -> Option<DynamicImage> {
    let page_id = pdf.page_id(0).ok()?;
    let resources = pdf.page_resources(page_id)?;
    let xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| pdf.resolve_dict(o))?;

    let mut candidates: Vec<(&[u8], &Stream)> = xobjects
        .iter()
        .filter_map(|(name, obj)| match pdf.resolve(obj) {
            Object::Stream(s) if is_image(&s.dict) => Some((name.as_slice(), s)),
            _ => None,
        })
        .collect();
    candidates.sort_by_key(|(_, s)| std::cmp::Reverse(pixel_area(&s.dict)));

    for (name, stream) in candidates {
        match decode_image(pdf, stream) {
            Ok(img) => {
                log::info!(
                    "Using image /{} ({}x{}) as page raster",
                    String::from_utf8_lossy(name),
                    img.width(),
                    img.height()
                );
                return Some(img);
            }
            Err(e) => log::warn!(
                "Cannot decode image /{}: {}",
                String::from_utf8_lossy(name),
                e
            ),
        }
    }
    None
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(|o| o.as_name()), Ok(b"Image"))
}

fn dimension(dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_i64().ok())
        .filter(|v| *v > 0)
        .map_or(0, |v| v as u32)
}

fn pixel_area(dict: &Dictionary) -> u64 {
    dimension(dict, b"Width") as u64 * dimension(dict, b"Height") as u64
}

/// Filter names applied to a stream, in order.
fn filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name_str().ok())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Number of color components of an image color space.
fn components(pdf: &PdfDocument, dict: &Dictionary) -> Result<usize> {
    let Ok(cs) = dict.get(b"ColorSpace") else {
        return Ok(1);
    };
    match pdf.resolve(cs) {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(3),
            b"DeviceCMYK" | b"CMYK" => Ok(4),
            other => Err(Error::Other(format!(
                "unsupported color space {}",
                String::from_utf8_lossy(other)
            ))),
        },
        Object::Array(arr) => match arr.first().and_then(|o| o.as_name().ok()) {
            Some(b"ICCBased") => arr
                .get(1)
                .and_then(|o| pdf.resolve_dict(o))
                .and_then(|d| d.get(b"N").ok())
                .and_then(|o| o.as_i64().ok())
                .map(|n| n as usize)
                .ok_or_else(|| Error::Other("ICC profile without /N".to_string())),
            Some(b"CalRGB") => Ok(3),
            Some(b"CalGray") => Ok(1),
            _ => Err(Error::Other("unsupported color space".to_string())),
        },
        _ => Err(Error::Other("invalid color space".to_string())),
    }
}

fn decode_image(pdf: &PdfDocument, stream: &Stream) -> Result<DynamicImage> {
    let dict = &stream.dict;
    let filters = filters(dict);

    if filters.last().is_some_and(|f| f == "DCTDecode" || f == "DCT") {
        let data = if filters.len() > 1 {
            stream.decompressed_content()?
        } else {
            stream.content.clone()
        };
        return Ok(image::load_from_memory_with_format(&data, ImageFormat::Jpeg)?);
    }
    // the image crate has no JPEG 2000, CCITT or JBIG2 decoder
    if let Some(unsupported) = filters
        .iter()
        .find(|f| matches!(f.as_str(), "JPXDecode" | "CCITTFaxDecode" | "JBIG2Decode"))
    {
        return Err(Error::Other(format!("{} images are not supported", unsupported)));
    }

    let width = dimension(dict, b"Width");
    let height = dimension(dict, b"Height");
    if width == 0 || height == 0 {
        return Err(Error::Other("image without dimensions".to_string()));
    }
    let image_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|o| o.as_bool().ok())
        .unwrap_or(false);
    let bits = if image_mask {
        1
    } else {
        dict.get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8)
    };
    let comps = if image_mask { 1 } else { components(pdf, dict)? };
    let data = stream_bytes(stream)?;

    samples_to_image(&data, width, height, comps, bits)
}

/// Build an image from raw samples (8-bit Gray/RGB/CMYK or 1-bit gray).
fn samples_to_image(
    data: &[u8],
    width: u32,
    height: u32,
    comps: usize,
    bits: i64,
) -> Result<DynamicImage> {
    let short = || Error::Other("image data shorter than declared size".to_string());
    let pixels = width as usize * height as usize;

    match (comps, bits) {
        (1, 8) => {
            let buf = data.get(..pixels).ok_or_else(short)?.to_vec();
            GrayImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(short)
        }
        (1, 1) => {
            let row_bytes = (width as usize).div_ceil(8);
            if data.len() < row_bytes * height as usize {
                return Err(short());
            }
            let mut img = GrayImage::new(width, height);
            for (x, y, px) in img.enumerate_pixels_mut() {
                let byte = data[y as usize * row_bytes + x as usize / 8];
                let bit = (byte >> (7 - (x % 8))) & 1;
                px.0[0] = if bit == 1 { 255 } else { 0 };
            }
            Ok(DynamicImage::ImageLuma8(img))
        }
        (3, 8) => {
            let buf = data.get(..pixels * 3).ok_or_else(short)?.to_vec();
            RgbImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(short)
        }
        (4, 8) => {
            let cmyk = data.get(..pixels * 4).ok_or_else(short)?;
            let rgb: Vec<u8> = cmyk
                .chunks_exact(4)
                .flat_map(|p| {
                    let k = 255 - p[3] as u32;
                    [
                        ((255 - p[0] as u32) * k / 255) as u8,
                        ((255 - p[1] as u32) * k / 255) as u8,
                        ((255 - p[2] as u32) * k / 255) as u8,
                    ]
                })
                .collect();
            RgbImage::from_raw(width, height, rgb)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(short)
        }
        _ => Err(Error::Other(format!(
            "unsupported sample layout: {} components at {} bits",
            comps, bits
        ))),
    }
}
