//! Compact path-geometry codec and turn-instruction synthesis.
//!
//! The wire format is the classic signed-delta polyline encoding
//! (base-64 offset 63, 5-bit groups, zig-zag sign handling) at 1e5
//! precision, as produced by OSRM and friends. Decoding is bit-exact
//! with the reference algorithm.

use crate::error::DecodeError;
use crate::types::coordinate::Coordinate;
use crate::types::route::RouteStep;

/// Fixed precision factor of the encoding: five decimal places.
const PRECISION: f64 = 1e5;

/// The fixed arrival instruction.
pub const ARRIVAL_TEXT: &str = "You have reached the Safe Zone";

/// Decodes an encoded polyline into an ordered coordinate path.
///
/// The input is consumed left to right, reconstructing cumulative
/// latitude/longitude deltas. A malformed input fails the whole
/// decode; no partial path is ever returned.
///
/// # Errors
/// * [`DecodeError::UnexpectedEnd`] - the string ended inside a value.
/// * [`DecodeError::ValueTooLong`] - a continuation run exceeded the
///   accumulator width; no real delta is that long.
/// * [`DecodeError::CoordinateOutOfRange`] - a reconstructed point left
///   the WGS84 domain, so the input cannot be a valid path.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        lng += next_value(bytes, &mut index)?;

        let latitude = lat as f64 / PRECISION;
        let longitude = lng as f64 / PRECISION;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DecodeError::CoordinateOutOfRange {
                latitude,
                longitude,
            });
        }

        points.push(Coordinate {
            latitude,
            longitude,
        });
    }

    Ok(points)
}

/// Reads one zig-zag encoded delta starting at `*index`.
fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let mut shift = 0;
    let mut result: i64 = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(DecodeError::UnexpectedEnd { index: *index });
        };
        // An i64 holds at most 13 five-bit groups; a longer run cannot
        // come from a real encoder.
        if shift >= 64 {
            return Err(DecodeError::ValueTooLong { index: *index });
        }
        *index += 1;

        let chunk = i64::from(byte) - 63;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    // Zig-zag: lowest bit carries the sign.
    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encodes a coordinate path into the polyline wire format.
///
/// The exact inverse of [`decode`] up to the 1e5 quantization: useful
/// for building fixtures and for handing paths back to providers.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lng = (point.longitude * PRECISION).round() as i64;
        push_value(lat - prev_lat, &mut out);
        push_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn push_value(value: i64, out: &mut String) {
    let mut v = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    };
    while v >= 0x20 {
        out.push((((0x20 | (v & 0x1f)) + 63) as u8) as char);
        v >>= 5;
    }
    out.push(((v + 63) as u8) as char);
}

/// Converts one route step into human instruction text.
///
/// The mapping is total: any maneuver kind the provider may invent
/// falls through to the plain "continue" phrasing, and a `turn` step
/// that arrives without its modifier does the same rather than
/// interpolating a hole into the sentence. Distances are rounded to
/// the nearest whole meter.
pub fn step_text(step: &RouteStep) -> String {
    let d = step.distance_meters.round() as i64;

    match step.maneuver.as_str() {
        "depart" => format!("Start and go straight for {d} m"),
        "turn" => match &step.modifier {
            Some(modifier) => format!("Turn {modifier} and continue for {d} m"),
            None => format!("Continue for {d} m"),
        },
        "arrive" => ARRIVAL_TEXT.to_string(),
        _ => format!("Continue for {d} m"),
    }
}

#[cfg(test)]
mod polyline_tests {
    use super::*;

    /// The canonical reference string from the polyline format
    /// documentation.
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    #[test]
    fn test_decode_reference_string() {
        let points = decode(REFERENCE).unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

        assert_eq!(points.len(), expected.len());
        for (point, (lat, lng)) in points.iter().zip(expected) {
            assert!((point.latitude - lat).abs() < 1e-5);
            assert!((point.longitude - lng).abs() < 1e-5);
        }
    }

    #[test]
    fn test_encode_matches_reference() {
        let points = vec![
            Coordinate {
                latitude: 38.5,
                longitude: -120.2,
            },
            Coordinate {
                latitude: 40.7,
                longitude: -120.95,
            },
            Coordinate {
                latitude: 43.252,
                longitude: -126.453,
            },
        ];
        assert_eq!(encode(&points), REFERENCE);
    }

    #[test]
    fn test_round_trip_preserves_points() {
        let points = vec![
            Coordinate {
                latitude: 16.5062,
                longitude: 80.6480,
            },
            Coordinate {
                latitude: 16.5071,
                longitude: 80.6492,
            },
            Coordinate {
                latitude: 16.5090,
                longitude: 80.6455,
            },
        ];

        let decoded = decode(&encode(&points)).unwrap();
        assert_eq!(decoded.len(), points.len());
        for (a, b) in decoded.iter().zip(&points) {
            assert!((a.latitude - b.latitude).abs() < 1e-5);
            assert!((a.longitude - b.longitude).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_input_decodes_to_empty_path() {
        assert_eq!(decode("").unwrap(), vec![]);
    }

    /// A string cut off mid-value must fail as a whole, not yield the
    /// points decoded so far.
    #[test]
    fn test_truncated_input_is_an_error() {
        let truncated = &REFERENCE[..REFERENCE.len() - 2];
        assert!(matches!(
            decode(truncated),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    /// A run of continuation bytes longer than any i64 delta can
    /// occupy must come back as an error, not blow up the decoder.
    #[test]
    fn test_overlong_continuation_run_is_an_error() {
        let hostile = "~".repeat(20);
        assert!(matches!(
            decode(&hostile),
            Err(DecodeError::ValueTooLong { .. })
        ));
    }

    fn step(distance: f64, maneuver: &str, modifier: Option<&str>) -> RouteStep {
        RouteStep {
            distance_meters: distance,
            maneuver: maneuver.to_string(),
            modifier: modifier.map(str::to_string),
        }
    }

    #[test]
    fn test_turn_step_text_rounds_distance() {
        assert_eq!(
            step_text(&step(123.6, "turn", Some("left"))),
            "Turn left and continue for 124 m"
        );
    }

    #[test]
    fn test_depart_step_text() {
        assert_eq!(
            step_text(&step(42.4, "depart", None)),
            "Start and go straight for 42 m"
        );
    }

    #[test]
    fn test_arrive_ignores_distance() {
        assert_eq!(step_text(&step(987.0, "arrive", None)), ARRIVAL_TEXT);
        assert_eq!(step_text(&step(0.0, "arrive", Some("right"))), ARRIVAL_TEXT);
    }

    #[test]
    fn test_unknown_maneuver_has_default_text() {
        assert_eq!(
            step_text(&step(58.0, "roundabout", None)),
            "Continue for 58 m"
        );
    }

    #[test]
    fn test_turn_without_modifier_falls_back() {
        assert_eq!(step_text(&step(30.0, "turn", None)), "Continue for 30 m");
    }
}
