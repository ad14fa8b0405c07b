//! # Encoded Polyline Codec
//!
//! Decoder and encoder for the encoded polyline algorithm format used by
//! mapping and fitness APIs (`map.summary_polyline` on Strava activities).
//!
//! Each coordinate is scaled by `10^precision`, rounded, and stored as the
//! delta from the previous coordinate. A delta is zig-zag encoded (left shift,
//! inverted when negative), split into 5-bit chunks from the least significant
//! end, and every chunk except the last is flagged with `0x20`. Chunks are
//! offset by 63 so the output stays in the printable range `'?'..='~'`.
//!
//! ```rust
//! use activity_routes::polyline;
//!
//! let route = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
//! assert_eq!(route.len(), 3);
//! assert_eq!(route[0].latitude, 38.5);
//! assert_eq!(route[0].longitude, -120.2);
//!
//! assert_eq!(polyline::encode(&route).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//! ```

use crate::error::PolylineError;
use crate::GpsPoint;

/// Decimal digits used by Strava and Google summary polylines (factor 1e5).
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest supported precision; beyond it the scaled values lose integer accuracy.
pub const MAX_PRECISION: u32 = 10;
const CHUNK_OFFSET: u8 = 63;
const MIN_CHAR: u8 = b'?';
const MAX_CHAR: u8 = b'~';
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
// 12 chunks carry 60 bits, well past any valid coordinate at max precision
const MAX_SHIFT: u32 = 55;

fn scale_factor(precision: u32) -> Result<f64, PolylineError> {
    if precision > MAX_PRECISION {
        return Err(PolylineError::UnsupportedPrecision(precision));
    }
    Ok(10f64.powi(precision as i32))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a polyline at the default precision of 5 digits.
///
/// An empty string decodes to an empty route.
pub fn decode(encoded: &str) -> Result<Vec<GpsPoint>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline whose coordinates were scaled by `10^precision`.
///
/// Fails on characters outside `'?'..='~'`, on input that ends inside a value
/// or after a lone latitude, and on coordinates outside the WGS84 range.
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<GpsPoint>, PolylineError> {
    let factor = scale_factor(precision)?;
    let len = encoded.len();
    let mut points = Vec::with_capacity(len / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < len {
        let lat_start = index;
        let lat_delta = read_value(encoded, &mut index)?;
        if index >= len {
            return Err(PolylineError::MissingLongitude { position: lat_start });
        }
        let lng_start = index;
        let lng_delta = read_value(encoded, &mut index)?;

        lat = lat
            .checked_add(lat_delta)
            .ok_or(PolylineError::Overflow { position: lat_start })?;
        lng = lng
            .checked_add(lng_delta)
            .ok_or(PolylineError::Overflow { position: lng_start })?;

        let point = GpsPoint::new(lat as f64 / factor, lng as f64 / factor);
        if !point.is_valid() {
            return Err(PolylineError::OutOfRange {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        points.push(point);
    }

    Ok(points)
}

/// Read one zig-zag encoded value starting at `index`, advancing past it.
fn read_value(encoded: &str, index: &mut usize) -> Result<i64, PolylineError> {
    let bytes = encoded.as_bytes();
    let start = *index;
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::Truncated { position: *index });
        };
        if !(MIN_CHAR..=MAX_CHAR).contains(&byte) {
            // Every earlier byte was ASCII, so `index` sits on a char boundary
            let character = encoded[*index..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(PolylineError::InvalidCharacter { character, position: *index });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { position: start });
        }

        let chunk = (byte - CHUNK_OFFSET) as i64;
        *index += 1;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a route at the default precision of 5 digits.
pub fn encode(points: &[GpsPoint]) -> Result<String, PolylineError> {
    encode_with_precision(points, DEFAULT_PRECISION)
}

/// Encode a route, scaling coordinates by `10^precision`.
pub fn encode_with_precision(points: &[GpsPoint], precision: u32) -> Result<String, PolylineError> {
    let factor = scale_factor(precision)?;
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        if !point.is_valid() {
            return Err(PolylineError::InvalidCoordinate {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        let lat = (point.latitude * factor).round() as i64;
        let lng = (point.longitude * factor).round() as i64;

        write_value(lat - prev_lat, &mut encoded);
        write_value(lng - prev_lng, &mut encoded);

        prev_lat = lat;
        prev_lng = lng;
    }

    Ok(encoded)
}

fn write_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        out.push((((value & CHUNK_MASK) | CONTINUATION) as u8 + CHUNK_OFFSET) as char);
        value >>= 5;
    }
    out.push((value as u8 + CHUNK_OFFSET) as char);
}

// ============================================================================
// Tests
// ============================================================================
