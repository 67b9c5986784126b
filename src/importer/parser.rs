use std::num::ParseFloatError;

use crate::db::StoreError;
use crate::domain::{generate_building_id, NewBuilding};

const WKT_PREFIX: &str = "MULTIPOLYGON";
const WKT_SUFFIX: &str = "))";

/// Why a single ingestion line was rejected.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid WKT format")]
    InvalidWkt,
    #[error("invalid height format: {0}")]
    InvalidHeight(#[from] ParseFloatError),
    #[error("invalid height value: {0}")]
    HeightOutOfRange(f64),
    #[error("database insert failed: {0}")]
    Store(#[from] StoreError),
}

/// Decode one raw line read from the ingestion file.
pub fn decode_line(raw: &[u8]) -> Result<&str, LineError> {
    std::str::from_utf8(raw).map_err(|_| LineError::InvalidEncoding)
}

/// Parse one `<MULTIPOLYGON WKT>,<height>` line.
///
/// The WKT itself contains commas, so only the last comma separates the
/// height. The caller is expected to have trimmed the line already.
pub fn parse_line(line: &str) -> Result<NewBuilding, LineError> {
    let (wkt_part, height_part) = line.rsplit_once(',').ok_or(LineError::InvalidFormat)?;

    let geometry = clean_field(wkt_part);
    let height_str = clean_field(height_part);

    if !is_multipolygon_wkt(geometry) {
        return Err(LineError::InvalidWkt);
    }

    let height: f64 = height_str.parse()?;
    if !height.is_finite() || height < 0.0 {
        return Err(LineError::HeightOutOfRange(height));
    }

    Ok(NewBuilding {
        id: generate_building_id(geometry),
        geometry: geometry.to_string(),
        height,
    })
}

/// Trim whitespace and one pair of matching `"` or `'` quotes.
fn clean_field(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

// 構文チェックのみ（ジオメトリのパースはDB側）
fn is_multipolygon_wkt(wkt: &str) -> bool {
    let has_prefix = wkt
        .get(..WKT_PREFIX.len())
        .map_or(false, |p| p.eq_ignore_ascii_case(WKT_PREFIX));

    has_prefix && wkt.ends_with(WKT_SUFFIX)
}
