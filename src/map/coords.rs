use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Parse `"13.6807° N, 79.3509° E"` style text.
///
/// The degree sign and hemisphere letter are stripped, South and West negate
/// the magnitude. Anything that does not yield two finite numbers is an error.
pub fn parse_coordinates(text: &str) -> Result<LatLng> {
    let invalid = || GalleryError::Coordinates(text.to_string());

    let parts: Vec<&str> = text.split(',').collect();
    let [lat_part, lng_part] = parts.as_slice() else {
        return Err(invalid());
    };
    let lat_part = lat_part.trim();
    let lng_part = lng_part.trim();

    let lat_value = leading_float(&strip_markers(lat_part, 'N', 'S')).ok_or_else(invalid)?;
    let lng_value = leading_float(&strip_markers(lng_part, 'E', 'W')).ok_or_else(invalid)?;

    let lat = if lat_part.contains('S') { -lat_value } else { lat_value };
    let lng = if lng_part.contains('W') { -lng_value } else { lng_value };

    if !lat.is_finite() || !lng.is_finite() {
        return Err(invalid());
    }
    Ok(LatLng { lat, lng })
}

fn strip_markers(part: &str, positive: char, negative: char) -> String {
    part.replacen('°', "", 1)
        .replacen(positive, "", 1)
        .replacen(negative, "", 1)
        .trim()
        .to_string()
}

/// Longest numeric prefix, so `"13.5 deg"` still reads as 13.5.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
