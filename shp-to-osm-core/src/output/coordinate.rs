//! Locale-independent coordinate rendering.

/// Fractional digits kept in written coordinates.
pub const COORDINATE_PRECISION: usize = 7;

/// Render a coordinate with at most seven fractional digits.
///
/// Trailing zeros and a trailing decimal point are dropped, no digit grouping
/// is applied, and negative zero prints as `0`.
///
/// # Examples
/// ```
/// use shp_to_osm_core::format_coordinate;
///
/// assert_eq!(format_coordinate(4.899_431_2), "4.8994312");
/// assert_eq!(format_coordinate(52.379_189_123_4), "52.3791891");
/// assert_eq!(format_coordinate(-71.0), "-71");
/// ```
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    let fixed = format!("{value:.precision$}", precision = COORDINATE_PRECISION);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}
