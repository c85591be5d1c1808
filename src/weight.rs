pub const NEUTRAL_QUALITY: f64 = 1.0;

/// Quality-adjusted xG. `shooter_quality` is validated when the ratings table
/// is loaded, so it is non-negative here.
pub fn weight(xg: f64, shooter_quality: f64) -> f64 {
    xg * shooter_quality
}
