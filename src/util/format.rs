//! Human-readable quantities for log lines

/// Metric magnitudes, descending
const PREFIXES: [(f64, &str); 5] = [(1e12, "P"), (1e9, "G"), (1e6, "M"), (1e3, "k"), (1e0, "")];

/// Format a value with an SI magnitude prefix and one decimal
///
/// # Examples
///
/// ```
/// use flowreplay::util::format::si_prefix;
///
/// assert_eq!(si_prefix(512.0, "B"), "512.0 B");
/// assert_eq!(si_prefix(1536.0, "B"), "1.5 kB");
/// assert_eq!(si_prefix(2_500_000.0, "B/s"), "2.5 MB/s");
/// ```
pub fn si_prefix(value: f64, unit: &str) -> String {
    for (power, prefix) in PREFIXES {
        if value > power {
            return format!("{:.1} {}{}", value / power, prefix, unit);
        }
    }

    format!("{:.1} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_prefix_magnitudes() {
        assert_eq!(si_prefix(999.0, "B"), "999.0 B");
        assert_eq!(si_prefix(1_500.0, "B"), "1.5 kB");
        assert_eq!(si_prefix(1_500_000.0, "B"), "1.5 MB");
        assert_eq!(si_prefix(1_500_000_000.0, "B"), "1.5 GB");
        assert_eq!(si_prefix(1_500_000_000_000.0, "B"), "1.5 PB");
    }

    #[test]
    fn test_si_prefix_boundary_stays_lower() {
        // Strictly greater than the power is required to move up
        assert_eq!(si_prefix(1000.0, "B"), "1000.0 B");
    }

    #[test]
    fn test_si_prefix_small_values() {
        assert_eq!(si_prefix(0.0, "B/s"), "0.0 B/s");
        assert_eq!(si_prefix(0.5, "B/s"), "0.5 B/s");
    }
}
