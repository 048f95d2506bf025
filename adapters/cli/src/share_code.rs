use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use doubles_draw_core::{CombinedSchedule, DrawParameters};

const SHARE_DOMAIN: &str = "draw";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded draw payload.
pub(crate) const SHARE_HEADER: &str = "draw:v1";
/// Delimiter used to separate the prefix, draw dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Finished draw together with the dimensions it was generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SharedDraw {
    /// Dimensions the draw was generated for.
    pub(crate) params: DrawParameters,
    /// Matches in wave and court order.
    pub(crate) schedule: CombinedSchedule,
}

impl SharedDraw {
    /// Encodes the draw into a single-line string suitable for pasting into chat.
    pub(crate) fn encode(&self) -> Result<String, ShareCodeError> {
        let json = serde_json::to_vec(&self.schedule).map_err(ShareCodeError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SHARE_HEADER}:{}x{}x{}:{encoded}",
            self.params.players_per_team(),
            self.params.waves(),
            self.params.courts()
        ))
    }

    /// Decodes a draw from its share code.
    ///
    /// The payload must have exactly the number of waves and courts named in the header.
    pub(crate) fn decode(value: &str) -> Result<Self, ShareCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ShareCodeError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ShareCodeError::MissingPrefix)?;
        let version = parts.next().ok_or(ShareCodeError::MissingVersion)?;
        let dimensions = parts.next().ok_or(ShareCodeError::MissingDimensions)?;
        let payload = parts.next().ok_or(ShareCodeError::MissingPayload)?;

        if domain != SHARE_DOMAIN {
            return Err(ShareCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != SHARE_VERSION {
            return Err(ShareCodeError::UnsupportedVersion(version.to_owned()));
        }

        let params = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ShareCodeError::InvalidEncoding)?;
        let schedule: CombinedSchedule =
            serde_json::from_slice(&bytes).map_err(ShareCodeError::InvalidPayload)?;

        let expected = (params.waves() as usize, params.courts() as usize);
        let found = (schedule.wave_count(), schedule.court_count());
        let ragged = schedule
            .waves()
            .iter()
            .any(|wave| wave.len() != expected.1);
        if found != expected || ragged {
            return Err(ShareCodeError::ShapeMismatch {
                dimensions: dimensions.to_owned(),
                waves: schedule.wave_count(),
            });
        }

        Ok(Self { params, schedule })
    }
}

/// Errors that can occur while decoding share codes.
#[derive(Debug)]
pub(crate) enum ShareCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the share code.
    MissingPrefix,
    /// The share code did not contain a version segment.
    MissingVersion,
    /// The share code did not include draw dimensions.
    MissingDimensions,
    /// The share code did not include the payload segment.
    MissingPayload,
    /// The share code used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The draw dimensions could not be parsed from the share code.
    InvalidDimensions(String),
    /// The payload does not fill the grid named in the header.
    ShapeMismatch {
        /// Dimensions segment from the header.
        dimensions: String,
        /// Waves present in the payload.
        waves: usize,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ShareCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "share code was empty"),
            Self::MissingPrefix => write!(f, "share code is missing the prefix"),
            Self::MissingVersion => write!(f, "share code is missing the version"),
            Self::MissingDimensions => write!(f, "share code is missing the draw dimensions"),
            Self::MissingPayload => write!(f, "share code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "share prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "share code version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse draw dimensions '{dimensions}'")
            }
            Self::ShapeMismatch { dimensions, waves } => write!(
                f,
                "payload with {waves} waves does not match dimensions '{dimensions}'"
            ),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode share payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse share payload: {error}")
            }
        }
    }
}

impl Error for ShareCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<DrawParameters, ShareCodeError> {
    let invalid = || ShareCodeError::InvalidDimensions(dimensions.to_owned());

    let mut values = dimensions.split(['x', 'X']).map(|value| {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&parsed| parsed > 0)
    });
    let players = values.next().flatten().ok_or_else(invalid)?;
    let waves = values.next().flatten().ok_or_else(invalid)?;
    let courts = values.next().flatten().ok_or_else(invalid)?;
    if values.next().is_some() {
        return Err(invalid());
    }

    Ok(DrawParameters::new(players, waves, courts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doubles_draw_core::{CombinedMatch, Pair};

    fn pair(a: u32, b: u32) -> Pair {
        Pair::from_positions(a, b).expect("distinct slots")
    }

    fn sample() -> SharedDraw {
        SharedDraw {
            params: DrawParameters::new(4, 2, 1),
            schedule: CombinedSchedule::from_waves(vec![
                vec![CombinedMatch::new(pair(1, 2), pair(3, 4))],
                vec![CombinedMatch::new(pair(3, 4), pair(1, 2))],
            ]),
        }
    }

    #[test]
    fn round_trip_preserves_draw() {
        let draw = sample();
        let encoded = draw.encode().expect("encodes");
        assert!(encoded.starts_with(&format!("{SHARE_HEADER}:4x2x1:")));

        let decoded = SharedDraw::decode(&encoded).expect("share code decodes");
        assert_eq!(draw, decoded);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = sample().encode().expect("encodes");
        let padded = format!("  {encoded}\n");
        assert_eq!(SharedDraw::decode(&padded).expect("decodes"), sample());
    }

    #[test]
    fn rejects_foreign_prefix_and_version() {
        assert!(matches!(
            SharedDraw::decode("maze:v1:4x2x1:AAAA"),
            Err(ShareCodeError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            SharedDraw::decode("draw:v9:4x2x1:AAAA"),
            Err(ShareCodeError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            SharedDraw::decode("   "),
            Err(ShareCodeError::EmptyPayload)
        ));
    }

    #[test]
    fn rejects_malformed_dimensions() {
        for dimensions in ["4x2", "4x0x1", "4x2x1x9", "fourx2x1"] {
            let code = format!("draw:v1:{dimensions}:AAAA");
            assert!(
                matches!(
                    SharedDraw::decode(&code),
                    Err(ShareCodeError::InvalidDimensions(_))
                ),
                "{dimensions} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_payload_that_disagrees_with_header() {
        let encoded = sample().encode().expect("encodes");
        let tampered = encoded.replacen("4x2x1", "4x3x1", 1);
        assert!(matches!(
            SharedDraw::decode(&tampered),
            Err(ShareCodeError::ShapeMismatch { waves: 2, .. })
        ));
    }

    #[test]
    fn rejects_slot_zero() {
        let payload = STANDARD_NO_PAD.encode(br#"[[{"red":[0,1],"black":[2,3]}]]"#);
        let code = format!("draw:v1:4x1x1:{payload}");
        assert!(matches!(
            SharedDraw::decode(&code),
            Err(ShareCodeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn rejects_degenerate_pairs() {
        let payload = STANDARD_NO_PAD.encode(br#"[[{"red":[1,1],"black":[2,3]}]]"#);
        let code = format!("draw:v1:4x1x1:{payload}");
        assert!(matches!(
            SharedDraw::decode(&code),
            Err(ShareCodeError::InvalidPayload(_))
        ));
    }
}
