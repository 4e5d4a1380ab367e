/// Text form of a value in the output files.
///
/// Shortest round-trip digits, switching to exponent notation below 1e-4 and
/// from 1e16 upward, the way spreadsheet users expect `6.954e-13` rather than a
/// run of zeros. NaN becomes an empty field and both zeros print as `0`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value == 0.0 {
        return "0".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let magnitude = value.abs();
    if !(1e-4..1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}
