use chrono::{DateTime, Utc};

/// Epoch milliseconds for a timestamp, clamped at zero for pre-epoch values.
pub fn to_ms(at: DateTime<Utc>) -> u64 {
    at.timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn converts_to_epoch_millis() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        assert_eq!(to_ms(at), 1_772_463_600_000);
    }

    #[test]
    fn pre_epoch_clamps_to_zero() {
        let at = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(to_ms(at), 0);
    }
}
