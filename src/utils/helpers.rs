//! Helper functions

/// Fahrenheit to whole Celsius, truncated toward zero.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    ((fahrenheit - 32.0) / 1.8) as i64
}

/// Parse operator input as a whole-degree threshold. Surrounding whitespace is ignored.
pub fn parse_celsius(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
