use chrono::DateTime;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_3_MIN: i64 = Self::MS_IN_MIN * 3;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_MIN * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_MIN * 15;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_4_H: i64 = Self::MS_IN_H * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}

/// Format an epoch-ms timestamp for logs and CLI summaries.
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => format!("invalid({})", epoch_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_constants_line_up() {
        assert_eq!(TimeUtils::MS_IN_MIN * 60, TimeUtils::MS_IN_H);
        assert_eq!(TimeUtils::MS_IN_H * 24, TimeUtils::MS_IN_D);
    }

    #[test]
    fn test_epoch_formatting() {
        // 2024-01-01 00:00 UTC
        assert_eq!(epoch_ms_to_utc(1_704_067_200_000), "2024-01-01 00:00");
    }
}
