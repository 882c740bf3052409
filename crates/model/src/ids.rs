use chrono::{DateTime, Local, TimeZone as _, Timelike as _, Utc};
use serde::{Deserialize, Serialize};

/// Calendar-day key pinned to local midnight, stored as UTC.
///
/// Trainings and nutrition entries are keyed by day, not by instant, so
/// both sides of a comparison must collapse to the same midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayId(DateTime<Utc>);

impl DayId {
    pub fn new(date_time: DateTime<Local>) -> Self {
        let midnight = date_time
            .with_hour(0)
            .and_then(|d| d.with_minute(0))
            .and_then(|d| d.with_second(0))
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(date_time);
        DayId(midnight.with_timezone(&Utc))
    }

    pub fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    pub fn id(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn next(&self) -> Self {
        DayId(self.0 + chrono::Duration::days(1))
    }

    pub fn prev(&self) -> Self {
        DayId(self.0 - chrono::Duration::days(1))
    }
}

impl From<DateTime<Local>> for DayId {
    fn from(date_time: DateTime<Local>) -> Self {
        DayId::new(date_time)
    }
}

impl From<DateTime<Utc>> for DayId {
    fn from(date_time: DateTime<Utc>) -> Self {
        DayId::new(date_time.with_timezone(&Local))
    }
}

impl Default for DayId {
    fn default() -> Self {
        DayId::new(Local::now())
    }
}

impl DayId {
    pub fn with_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .map(|d| DayId(d.with_timezone(&Utc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_day_collapses() {
        let morning = Local.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2025, 3, 10, 22, 15, 59).unwrap();
        assert_eq!(DayId::new(morning), DayId::new(evening));
    }

    #[test]
    fn test_next_prev() {
        let day = DayId::with_ymd(2025, 3, 10).unwrap();
        assert_eq!(day, day.next().prev());
        assert!(day < day.next());
    }
}
