use dlpilot::parse::{parse_destination, parse_progress};
use proptest::prelude::*;

proptest! {
    /// Every integer percentage in a well-formed download line parses back
    /// to itself.
    #[test]
    fn test_progress_integer_roundtrip(p in 0u32..=100) {
        let line = format!("[download] {p}% of 10.00MiB at 1.00MiB/s");
        prop_assert_eq!(parse_progress(&line), Some(f64::from(p)));
    }

    /// Fractional percentages survive parsing bit-for-bit.
    #[test]
    fn test_progress_fractional_roundtrip(whole in 0u32..100, frac in 0u32..10) {
        let rendered = format!("{whole}.{frac}");
        let line = format!("[download]  {rendered}% of 10.00MiB");
        let expected: f64 = rendered.parse().unwrap();
        prop_assert_eq!(parse_progress(&line), Some(expected));
    }

    /// The completion marker wins over any percentage earlier in the line.
    #[test]
    fn test_marker_dominates_any_prefix(p in 0u32..100) {
        let line = format!("[download] {p}.0% then [download] 100% done");
        prop_assert_eq!(parse_progress(&line), Some(100.0));
    }

    /// Digit-free lines can never produce a percentage.
    #[test]
    fn test_no_digits_no_progress(line in "[a-zA-Z .:/\\[\\]%-]*") {
        prop_assert_eq!(parse_progress(&line), None);
    }

    /// Destination announcements hand the path back unchanged.
    #[test]
    fn test_destination_roundtrip(name in "[a-zA-Z0-9_.-]{1,20}") {
        let line = format!("[download] Destination: {name}");
        let parsed = parse_destination(&line);
        prop_assert_eq!(parsed.as_deref(), Some(name.as_str()));
    }
}
