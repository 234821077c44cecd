//! Temperature validation shared by all backends.

use std::ops::RangeInclusive;
use tracing::warn;

/// Temperature used when none is requested or the requested one is unusable.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Resolve a requested temperature against a provider's accepted range.
///
/// Out-of-range and non-finite values fall back to [`DEFAULT_TEMPERATURE`]
/// with a warning instead of failing the call.
///
/// # Examples
///
/// ```
/// use scriptorium_models::{DEFAULT_TEMPERATURE, sanitize_temperature};
///
/// assert_eq!(sanitize_temperature("claude", Some(0.2), 0.0..=1.0), 0.2);
/// assert_eq!(sanitize_temperature("claude", Some(1.4), 0.0..=1.0), DEFAULT_TEMPERATURE);
/// assert_eq!(sanitize_temperature("gpt", Some(f32::NAN), 0.0..=2.0), DEFAULT_TEMPERATURE);
/// assert_eq!(sanitize_temperature("gpt", None, 0.0..=2.0), DEFAULT_TEMPERATURE);
/// ```
pub fn sanitize_temperature(
    backend: &str,
    requested: Option<f32>,
    range: RangeInclusive<f32>,
) -> f32 {
    match requested {
        None => DEFAULT_TEMPERATURE,
        Some(value) if value.is_finite() && range.contains(&value) => value,
        Some(value) => {
            warn!(
                backend,
                temperature = value,
                min = *range.start(),
                max = *range.end(),
                "Invalid temperature value, using default {}",
                DEFAULT_TEMPERATURE
            );
            DEFAULT_TEMPERATURE
        }
    }
}
