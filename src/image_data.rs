//! Validation of the `data:image/...;base64,...` URIs posted by the upload page.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};

use crate::error::ValidationError;

const DATA_IMAGE_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// An upload that passed validation, with its payload decoded.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    format: ImageFormat,
    base64: String,
    bytes: Vec<u8>,
    dimensions: Option<(u32, u32)>,
}

impl ImageUpload {
    /// Parses a data URI. `None` stands for a missing or non-string `image` field.
    pub fn from_data_uri(value: Option<&str>) -> Result<Self, ValidationError> {
        let value = value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::InvalidData)?;

        let rest = value
            .strip_prefix(DATA_IMAGE_PREFIX)
            .ok_or(ValidationError::InvalidFormat)?;

        let subtype_end = rest.find(|c| c == ';' || c == ',').unwrap_or(rest.len());
        let format = ImageFormat::from_subtype(&rest[..subtype_end])
            .ok_or(ValidationError::UnsupportedFormat)?;

        let payload = rest[subtype_end..]
            .strip_prefix(BASE64_MARKER)
            .ok_or(ValidationError::InvalidFormat)?
            .trim();

        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| ValidationError::InvalidData)?;
        if bytes.is_empty() {
            return Err(ValidationError::InvalidData);
        }

        let dimensions = read_dimensions(&bytes);

        Ok(Self {
            format,
            base64: payload.to_string(),
            bytes,
            dimensions,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel size, when the payload could be read as an image.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{}{}{}",
            self.format.mime_type(),
            BASE64_MARKER,
            self.base64
        )
    }
}

fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_data_uri(width: u32, height: u32) -> String {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut png_bytes = Vec::new();
        img.write_to(
            &mut Cursor::new(&mut png_bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&png_bytes)
        )
    }

    #[test]
    fn accepts_png_and_reads_dimensions() {
        let uri = png_data_uri(32, 18);
        let upload = ImageUpload::from_data_uri(Some(&uri)).unwrap();

        assert_eq!(upload.format(), ImageFormat::Png);
        assert_eq!(upload.dimensions(), Some((32, 18)));
        assert_eq!(upload.data_uri(), uri);
        assert!(upload.bytes().starts_with(b"\x89PNG"));
    }

    #[test]
    fn accepts_undecodable_bytes_without_dimensions() {
        let upload = ImageUpload::from_data_uri(Some("data:image/jpeg;base64,aGVsbG8=")).unwrap();
        assert_eq!(upload.format(), ImageFormat::Jpeg);
        assert_eq!(upload.dimensions(), None);
        assert_eq!(upload.base64(), "aGVsbG8=");
    }

    #[test]
    fn missing_or_empty_is_invalid_data() {
        assert_eq!(
            ImageUpload::from_data_uri(None).unwrap_err(),
            ValidationError::InvalidData
        );
        assert_eq!(
            ImageUpload::from_data_uri(Some("   ")).unwrap_err(),
            ValidationError::InvalidData
        );
    }

    #[test]
    fn non_image_uris_are_invalid_format() {
        for value in [
            "hello",
            "data:text/plain;base64,aGk=",
            "https://example.com/cat.png",
            "data:image/png,aGk=",
        ] {
            assert_eq!(
                ImageUpload::from_data_uri(Some(value)).unwrap_err(),
                ValidationError::InvalidFormat,
                "{value}"
            );
        }
    }

    #[test]
    fn other_image_types_are_unsupported() {
        for value in [
            "data:image/gif;base64,R0lGOD",
            "data:image/svg+xml;base64,PHN2Zz4=",
            "data:image/jpg;base64,aGk=",
        ] {
            assert_eq!(
                ImageUpload::from_data_uri(Some(value)).unwrap_err(),
                ValidationError::UnsupportedFormat,
                "{value}"
            );
        }
    }

    #[test]
    fn bad_payload_is_invalid_data() {
        assert_eq!(
            ImageUpload::from_data_uri(Some("data:image/webp;base64,")).unwrap_err(),
            ValidationError::InvalidData
        );
        assert_eq!(
            ImageUpload::from_data_uri(Some("data:image/webp;base64,!!not base64!!"))
                .unwrap_err(),
            ValidationError::InvalidData
        );
    }

    #[test]
    fn subtype_is_case_insensitive_and_whitespace_is_trimmed() {
        let upload =
            ImageUpload::from_data_uri(Some("  data:image/PNG;base64,aGVsbG8=\n")).unwrap();
        assert_eq!(upload.format(), ImageFormat::Png);
        assert_eq!(upload.data_uri(), "data:image/png;base64,aGVsbG8=");
    }
}
