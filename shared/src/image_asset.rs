use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::IntakeError;

/// Where an [`ImageAsset`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageSource {
    Uploaded,
    Captured,
}

/// An encoded still image held in memory.
///
/// `encoded` is the standard base64 form of the file bytes. Assets are
/// replaced wholesale on a new selection or capture and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub mime_type: String,
    pub encoded: String,
    pub source: ImageSource,
}

impl ImageAsset {
    pub fn from_bytes(mime_type: &str, bytes: &[u8], source: ImageSource) -> Result<Self, IntakeError> {
        check_mime(mime_type)?;
        if bytes.is_empty() {
            return Err(IntakeError::EmptyFile);
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            encoded: general_purpose::STANDARD.encode(bytes),
            source,
        })
    }

    /// Builds an asset from an already base64 encoded payload, checking that it decodes.
    pub fn from_encoded(mime_type: &str, encoded: &str, source: ImageSource) -> Result<Self, IntakeError> {
        check_mime(mime_type)?;
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(IntakeError::EmptyFile);
        }
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| IntakeError::InvalidEncoding)?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            encoded: encoded.to_string(),
            source,
        })
    }

    /// Parses a `data:<mime>;base64,<payload>` URL as produced by a file reader or canvas.
    pub fn from_data_url(url: &str, source: ImageSource) -> Result<Self, IntakeError> {
        let rest = url.strip_prefix("data:").ok_or(IntakeError::MalformedDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(IntakeError::MalformedDataUrl)?;
        let header = header.strip_suffix(";base64").ok_or(IntakeError::MalformedDataUrl)?;
        let mime_type = header.split(';').next().unwrap_or_default();

        Self::from_encoded(mime_type, payload, source)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded)
    }

    pub fn decode(&self) -> Result<Vec<u8>, IntakeError> {
        general_purpose::STANDARD
            .decode(&self.encoded)
            .map_err(|_| IntakeError::InvalidEncoding)
    }

    /// Size of the decoded payload, computed from the base64 length.
    pub fn decoded_len(&self) -> u64 {
        let len = self.encoded.len() as u64;
        let padding = self.encoded.bytes().rev().take_while(|b| *b == b'=').count() as u64;
        (len / 4 * 3).saturating_sub(padding)
    }
}

fn check_mime(mime_type: &str) -> Result<(), IntakeError> {
    if mime_type.starts_with("image/") {
        Ok(())
    } else {
        Err(IntakeError::InvalidType {
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reader_data_url() {
        let asset = ImageAsset::from_data_url("data:image/png;base64,aGVsbG8=", ImageSource::Uploaded).unwrap();

        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.encoded, "aGVsbG8=");
        assert_eq!(asset.decode().unwrap(), b"hello");
        assert_eq!(asset.decoded_len(), 5);
        assert_eq!(asset.data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn rejects_non_image_and_malformed_urls() {
        assert_eq!(
            ImageAsset::from_data_url("data:text/plain;base64,aGVsbG8=", ImageSource::Uploaded),
            Err(IntakeError::InvalidType {
                mime_type: "text/plain".into()
            })
        );
        assert_eq!(
            ImageAsset::from_data_url("image/png;base64,aGVsbG8=", ImageSource::Uploaded),
            Err(IntakeError::MalformedDataUrl)
        );
        assert_eq!(
            ImageAsset::from_data_url("data:image/png,raw", ImageSource::Uploaded),
            Err(IntakeError::MalformedDataUrl)
        );
        assert_eq!(
            ImageAsset::from_data_url("data:image/png;base64,", ImageSource::Uploaded),
            Err(IntakeError::EmptyFile)
        );
        assert_eq!(
            ImageAsset::from_encoded("image/png", "not base64!", ImageSource::Captured),
            Err(IntakeError::InvalidEncoding)
        );
    }

    #[test]
    fn decoded_len_handles_padding() {
        for bytes in [&b"a"[..], b"ab", b"abc", b"abcd"] {
            let asset = ImageAsset::from_bytes("image/jpeg", bytes, ImageSource::Captured).unwrap();
            assert_eq!(asset.decoded_len(), bytes.len() as u64);
        }
    }
}
