use chrono::{DateTime, NaiveDate, Utc};

/// Current UTC timestamp (millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Business date (UTC) of a millisecond timestamp
pub fn business_date(millis: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .date_naive()
}

/// Today's business date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_date_is_utc() {
        // 2024-01-01T23:59:59.999Z
        assert_eq!(
            business_date(1_704_153_599_999),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            business_date(1_704_153_600_000),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
