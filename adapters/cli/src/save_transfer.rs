#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};

const SAVE_DOMAIN: &str = "td";
const SAVE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded save payload.
pub(crate) const SAVE_HEADER: &str = "td:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a serialized game state into a single-line string suitable for
/// copying between terminals.
#[must_use]
pub(crate) fn encode(data: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(data);
    format!("{SAVE_HEADER}:{encoded}")
}

/// Decodes the serialized game state carried by a transfer string.
pub(crate) fn decode(value: &str) -> Result<Vec<u8>, SaveTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SaveTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(SaveTransferError::MissingPayload)?;

    if domain != SAVE_DOMAIN {
        return Err(SaveTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveTransferError::UnsupportedVersion(version.to_owned()));
    }

    STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveTransferError::InvalidEncoding)
}

/// Errors that can occur while decoding save transfer strings.
#[derive(Debug)]
pub(crate) enum SaveTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The payload segment was missing.
    MissingPayload,
    /// The string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
}

impl fmt::Display for SaveTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "save string was empty"),
            Self::MissingPrefix => write!(f, "save string is missing the prefix"),
            Self::MissingVersion => write!(f, "save string is missing the version"),
            Self::MissingPayload => write!(f, "save string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "save prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "save version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode save payload: {error}"),
        }
    }
}

impl Error for SaveTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_save_payload() {
        let data = br#"{"towers":[],"enemies":[],"projectiles":[],"wave":3,"gold":40,"lives":18,"score":120,"gameOver":false}"#;

        let encoded = encode(data);
        assert!(encoded.starts_with(&format!("{SAVE_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&encoded).expect("save decodes");
        assert_eq!(decoded, data);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = format!("  {}\n", encode(b"{}"));
        assert_eq!(decode(&encoded).expect("save decodes"), b"{}");
    }

    #[test]
    fn rejects_foreign_prefix_and_version() {
        assert!(matches!(
            decode("layout:v1:e30"),
            Err(SaveTransferError::InvalidPrefix(prefix)) if prefix == "layout"
        ));
        assert!(matches!(
            decode("td:v9:e30"),
            Err(SaveTransferError::UnsupportedVersion(version)) if version == "v9"
        ));
    }

    #[test]
    fn rejects_truncated_strings() {
        assert!(matches!(decode("   "), Err(SaveTransferError::EmptyPayload)));
        assert!(matches!(decode("td"), Err(SaveTransferError::MissingVersion)));
        assert!(matches!(decode("td:v1"), Err(SaveTransferError::MissingPayload)));
        assert!(matches!(
            decode("td:v1:@@@"),
            Err(SaveTransferError::InvalidEncoding(_))
        ));
    }
}
