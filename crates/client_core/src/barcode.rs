//! Driver's-license barcode reading: image → PDF417 text → fixed-width fields.

use image::DynamicImage;
use rxing::BarcodeFormat;
use serde::{ser::SerializeMap, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

/// Width of the field key at the start of every record line.
pub const KEY_WIDTH: usize = 3;

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("unable to read image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unable to decode file")]
    Undecodable,
    #[error("unable to serialize decoded fields: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait BarcodeReader: Send + Sync {
    fn decode_pdf417(&self, image: &DynamicImage) -> Option<String>;
}

pub struct RxingPdf417Reader;

impl BarcodeReader for RxingPdf417Reader {
    fn decode_pdf417(&self, image: &DynamicImage) -> Option<String> {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        match rxing::helpers::detect_in_luma(
            luma.into_raw(),
            width,
            height,
            Some(BarcodeFormat::PDF_417),
        ) {
            Ok(result) => Some(result.getText().to_string()),
            Err(err) => {
                debug!(error = ?err, "no pdf417 barcode found");
                None
            }
        }
    }
}

/// One `KEY value` line of a decoded record; serializes as `{"KEY": "value"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseField {
    pub key: String,
    pub value: String,
}

impl LicenseField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Serialize for LicenseField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

pub fn read_image_file(bytes: &[u8]) -> Result<DynamicImage, BarcodeError> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn decode_barcode(reader: &dyn BarcodeReader, image: &DynamicImage) -> Option<String> {
    reader
        .decode_pdf417(image)
        .filter(|text| !text.is_empty())
}

/// Splits `text` into one field per line, keyed by the line's first
/// [`KEY_WIDTH`] characters. Lines are never merged or dropped; a line shorter
/// than the key width becomes a key with an empty value. A trailing `\r` is
/// not part of the value. Empty input has no lines.
pub fn parse_fixed_width_records(text: &str) -> Vec<LicenseField> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let split = line
                .char_indices()
                .nth(KEY_WIDTH)
                .map(|(idx, _)| idx)
                .unwrap_or(line.len());
            let (key, value) = line.split_at(split);
            LicenseField::new(key, value)
        })
        .collect()
}

/// Decodes the license barcode in an image file and renders its fields as
/// pretty-printed JSON.
pub fn drivers_license_data(
    reader: &dyn BarcodeReader,
    image_bytes: &[u8],
) -> Result<String, BarcodeError> {
    let image = read_image_file(image_bytes)?;
    let decoded = decode_barcode(reader, &image).ok_or(BarcodeError::Undecodable)?;
    let fields = parse_fixed_width_records(&decoded);
    info!(fields = fields.len(), "license barcode decoded");
    Ok(serde_json::to_string_pretty(&fields)?)
}

#[cfg(test)]
#[path = "tests/barcode_tests.rs"]
mod tests;
