/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
///
/// Used for order numbers, so a retried checkout yields a new number.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Clamp client pagination to `[1, max]` / `>= 0`
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>, default: i64, max: i64) -> (i64, i64) {
    let limit = match limit {
        Some(l) if l > 0 => l.min(max),
        _ => default.min(max),
    };
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_is_positive_and_fits_53_bits() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(None, None, 20, 100), (20, 0));
        assert_eq!(clamp_page(Some(500), Some(10), 20, 100), (100, 10));
        assert_eq!(clamp_page(Some(0), Some(-5), 20, 100), (20, 0));
        assert_eq!(clamp_page(Some(-1), None, 20, 100), (20, 0));
        assert_eq!(clamp_page(Some(7), None, 20, 100), (7, 0));
    }
}
