//! Schedule form state and date arithmetic
//!
//! A post is either published now or scheduled. Scheduled posts are either a
//! single manual date/time or an automatic cadence (daily, weekly, twice a
//! week, weekends). The backend receives an explicit timestamp either way;
//! the cadence only drives the "next post" preview and the start date.
//!
//! All times here are local wall-clock times. The timestamp sent to the
//! backend is labelled with the configured offset (`+05:30` by default).

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BuzzError, Result};

pub const PAST_SCHEDULE_MESSAGE: &str =
    "Please select a future date and time to schedule your post.";
pub const MISSING_SCHEDULE_MESSAGE: &str =
    "Please select a date and time to schedule your post.";
pub const TWICE_WEEKLY_DAYS_MESSAGE: &str =
    "Please select exactly two days for 2 per week scheduling";

/// Preset times offered by the preferred-time picker
pub const PRESET_TIMES: [&str; 5] = ["09:00", "12:00", "15:00", "18:00", "21:00"];

/// Minutes ahead of now used to seed a fresh schedule
const SEED_LEAD_MINUTES: i64 = 5;

/// Days after today used to seed the end date
const SEED_END_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    #[default]
    Now,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "2perweek")]
    TwicePerWeek,
    #[serde(rename = "weekend")]
    Weekend,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::TwicePerWeek => "2perweek",
            Frequency::Weekend => "weekend",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = BuzzError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "2perweek" | "twice-weekly" | "twiceweekly" => Ok(Frequency::TwicePerWeek),
            "weekend" => Ok(Frequency::Weekend),
            other => Err(BuzzError::InvalidInput(format!(
                "Unknown frequency '{}'. Valid options: daily, weekly, 2perweek, weekend",
                other
            ))),
        }
    }
}

/// How a scheduled post picks its date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleType {
    /// One explicit date and time
    #[default]
    Manual,
    /// Evenly distributed; the frequency stays unset until the user picks one
    Auto(Option<Frequency>),
}

/// The preferred-time picker: a preset or a custom H:M:S
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredTime {
    Preset(NaiveTime),
    Custom(NaiveTime),
}

impl PreferredTime {
    pub fn time(&self) -> NaiveTime {
        match self {
            PreferredTime::Preset(t) | PreferredTime::Custom(t) => *t,
        }
    }

    /// Parse a preset ("09:00") or a custom H:M:S value
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if PRESET_TIMES.contains(&value) {
            return parse_time(value).map(PreferredTime::Preset);
        }
        parse_time(value).map(PreferredTime::Custom)
    }
}

impl Default for PreferredTime {
    fn default() -> Self {
        PreferredTime::Preset(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

/// State of the scheduling section of the composer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleForm {
    pub mode: PublishMode,
    pub schedule_type: ScheduleType,
    /// Scheduled date, or the start date for automatic cadences
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub preferred_time: PreferredTime,
    weekdays: Vec<Weekday>,
}

impl ScheduleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scheduled(&self) -> bool {
        self.mode == PublishMode::Scheduled
    }

    pub fn frequency(&self) -> Option<Frequency> {
        match self.schedule_type {
            ScheduleType::Auto(f) => f,
            ScheduleType::Manual => None,
        }
    }

    /// Switch between publish-now and scheduled.
    ///
    /// Entering `Scheduled` seeds today's date, a time five minutes out and an
    /// end date a week out, leaving any value the user already set alone.
    /// An automatic cadence with a custom preferred time seeds that time
    /// instead.
    pub fn set_mode(&mut self, mode: PublishMode, now: NaiveDateTime) {
        self.mode = mode;
        if mode != PublishMode::Scheduled {
            return;
        }

        let today = now.date();
        if self.date.is_none() {
            self.date = Some(today);
        }
        if self.time.is_none() {
            self.time = Some(match (self.schedule_type, self.preferred_time) {
                (ScheduleType::Auto(_), PreferredTime::Custom(t)) => t,
                _ => seed_time(now),
            });
        }
        if self.end_date.is_none() {
            self.end_date = Some(today + Duration::days(SEED_END_DAYS));
        }
    }

    pub fn set_schedule_type(&mut self, schedule_type: ScheduleType) {
        self.schedule_type = schedule_type;
        if let ScheduleType::Auto(_) = schedule_type {
            self.time = Some(self.preferred_time.time());
        }
    }

    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.schedule_type = ScheduleType::Auto(Some(frequency));
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn set_time(&mut self, time: NaiveTime) {
        self.time = Some(time);
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end_date = Some(date);
    }

    pub fn set_preferred_time(&mut self, preferred: PreferredTime) {
        self.preferred_time = preferred;
        self.time = Some(preferred.time());
    }

    /// Selected twice-weekly days, ordered Sunday first
    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    /// A day can be picked if it is already selected or fewer than two are
    pub fn can_select_weekday(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day) || self.weekdays.len() < 2
    }

    /// Toggle a twice-weekly day. Returns false when a third day is refused.
    pub fn toggle_weekday(&mut self, day: Weekday) -> bool {
        if let Some(pos) = self.weekdays.iter().position(|d| *d == day) {
            self.weekdays.remove(pos);
            return true;
        }
        if self.weekdays.len() >= 2 {
            return false;
        }
        self.weekdays.push(day);
        self.weekdays.sort_by_key(|d| d.num_days_from_sunday());
        true
    }

    /// Date of the next post for automatic cadences, as previewed to the user
    pub fn next_post_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let start = self.date?;
        match self.frequency()? {
            Frequency::Daily => Some(start),
            Frequency::Weekly => Some(next_weekly_date(start, today)),
            Frequency::TwicePerWeek => {
                if self.weekdays.len() == 2 {
                    next_matching_weekday(start, &self.weekdays)
                } else {
                    None
                }
            }
            Frequency::Weekend => next_matching_weekday(start, &[Weekday::Sat, Weekday::Sun]),
        }
    }

    /// Check the form before submission
    pub fn validate(&self, now: NaiveDateTime) -> Result<()> {
        if !self.is_scheduled() {
            return Ok(());
        }

        let (Some(date), Some(time)) = (self.date, self.time) else {
            return Err(BuzzError::Validation(MISSING_SCHEDULE_MESSAGE.to_string()));
        };

        if self.frequency() == Some(Frequency::TwicePerWeek) && self.weekdays.len() != 2 {
            return Err(BuzzError::Validation(TWICE_WEEKLY_DAYS_MESSAGE.to_string()));
        }

        validate_schedule_datetime(&format_date(date), &format_time(time), now)
    }

    /// Timestamp sent to the backend, or None for publish-now
    pub fn scheduled_timestamp(&self, offset: &str) -> Option<String> {
        if !self.is_scheduled() {
            return None;
        }
        let date = self.date?;
        let time = self.time?;
        compose_scheduled_timestamp(&format_date(date), &format_time(time), offset)
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn seed_time(now: NaiveDateTime) -> NaiveTime {
    let ahead = (now + Duration::minutes(SEED_LEAD_MINUTES)).time();
    ahead.with_second(0).unwrap_or(ahead).with_nanosecond(0).unwrap_or(ahead)
}

/// Weekly cadence: a start date of today or earlier rolls to the same weekday next week
pub fn next_weekly_date(start: NaiveDate, today: NaiveDate) -> NaiveDate {
    if start <= today {
        start + Duration::days(7)
    } else {
        start
    }
}

/// First date in `start..=start + 7` falling on one of `days`
pub fn next_matching_weekday(start: NaiveDate, days: &[Weekday]) -> Option<NaiveDate> {
    (0..=7)
        .map(|offset| start + Duration::days(offset))
        .find(|date| days.contains(&date.weekday()))
}

/// Reject a date/time that is not strictly after `now`.
///
/// Either part being empty means the post is not being scheduled and passes.
pub fn validate_schedule_datetime(date: &str, time: &str, now: NaiveDateTime) -> Result<()> {
    if date.trim().is_empty() || time.trim().is_empty() {
        return Ok(());
    }

    let selected = parse_date(date)?.and_time(parse_time(time)?);
    if selected <= now {
        return Err(BuzzError::Validation(PAST_SCHEDULE_MESSAGE.to_string()));
    }
    Ok(())
}

/// `YYYY-MM-DD` prefix of a date or date-time string
pub fn to_date_only_string(value: &str) -> String {
    value.chars().take(10).collect()
}

/// `{date}T{time}{offset}`, with `:00` seconds added to an `HH:MM` time
pub fn compose_scheduled_timestamp(date: &str, time: &str, offset: &str) -> Option<String> {
    let date = to_date_only_string(date.trim());
    if date.is_empty() || time.trim().is_empty() {
        return None;
    }
    let time = time.trim();
    let time = if time.len() == 5 {
        format!("{}:00", time)
    } else {
        time.to_string()
    };
    Some(format!("{}T{}{}", date, time, offset))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&to_date_only_string(value.trim()), "%Y-%m-%d").map_err(|_| {
        BuzzError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Accepts `HH:MM` and `H:M:S`
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| BuzzError::InvalidInput(format!("Invalid time '{}', expected HH:MM", value)))
}

/// 24-hour `HH:MM` to (hour, minute, "AM"/"PM")
pub fn to_12_hour(time: &str) -> Result<(u32, u32, &'static str)> {
    let parsed = parse_time(time)?;
    let (hour, minute) = (parsed.hour(), parsed.minute());
    Ok(match hour {
        0 => (12, minute, "AM"),
        1..=11 => (hour, minute, "AM"),
        12 => (12, minute, "PM"),
        _ => (hour - 12, minute, "PM"),
    })
}

/// (hour, minute, period) on a 12-hour clock to `HH:MM`
pub fn to_24_hour(hour: u32, minute: u32, period: &str) -> Result<String> {
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(BuzzError::InvalidInput(format!(
            "Invalid 12-hour time {}:{:02} {}",
            hour, minute, period
        )));
    }
    let hour24 = match period.trim().to_uppercase().as_str() {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        other => {
            return Err(BuzzError::InvalidInput(format!(
                "Invalid period '{}', expected AM or PM",
                other
            )))
        }
    };
    Ok(format!("{:02}:{:02}", hour24, minute))
}

/// Parse free-form schedule input ("tomorrow 9am", "2h", "2025-11-20 15:00")
/// into a local date-time.
pub fn parse_schedule(input: &str, now: DateTime<Local>) -> Result<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BuzzError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    if let Ok(duration) = humantime::parse_duration(input) {
        let duration = Duration::from_std(duration)
            .map_err(|_| BuzzError::InvalidInput("Duration out of range".to_string()))?;
        return Ok((now + duration).naive_local());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }

    chrono_english::parse_date_string(input, now, chrono_english::Dialect::Us)
        .map(|dt| dt.naive_local())
        .map_err(|e| BuzzError::InvalidInput(format!("Could not parse schedule '{}': {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_entering_scheduled_seeds_fields() {
        let mut form = ScheduleForm::new();
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 14, 58));

        assert_eq!(form.date, Some(date(2025, 3, 10)));
        assert_eq!(form.time, NaiveTime::from_hms_opt(15, 3, 0));
        assert_eq!(form.end_date, Some(date(2025, 3, 17)));
    }

    #[test]
    fn test_entering_scheduled_seeds_custom_preferred_time() {
        let custom = NaiveTime::from_hms_opt(18, 45, 30).unwrap();
        let mut form = ScheduleForm {
            schedule_type: ScheduleType::Auto(Some(Frequency::Daily)),
            preferred_time: PreferredTime::Custom(custom),
            ..Default::default()
        };
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 14, 58));
        assert_eq!(form.time, Some(custom));

        // A preset, or manual scheduling, still seeds five minutes out
        let mut form = ScheduleForm {
            schedule_type: ScheduleType::Manual,
            preferred_time: PreferredTime::Custom(custom),
            ..Default::default()
        };
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 14, 58));
        assert_eq!(form.time, NaiveTime::from_hms_opt(15, 3, 0));

        let mut form = ScheduleForm {
            schedule_type: ScheduleType::Auto(None),
            ..Default::default()
        };
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 14, 58));
        assert_eq!(form.time, NaiveTime::from_hms_opt(15, 3, 0));
    }

    #[test]
    fn test_seeding_keeps_user_values() {
        let mut form = ScheduleForm::new();
        form.set_date(date(2025, 4, 1));
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 9, 0));
        assert_eq!(form.date, Some(date(2025, 4, 1)));
    }

    #[test]
    fn test_seed_time_rolls_over_midnight() {
        let mut form = ScheduleForm::new();
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 23, 58));
        assert_eq!(form.time, NaiveTime::from_hms_opt(0, 3, 0));
    }

    #[test]
    fn test_weekly_same_day_rolls_a_week() {
        let today = date(2025, 3, 10);
        assert_eq!(next_weekly_date(today, today), date(2025, 3, 17));
        assert_eq!(next_weekly_date(date(2025, 3, 8), today), date(2025, 3, 15));
        assert_eq!(next_weekly_date(date(2025, 3, 12), today), date(2025, 3, 12));

        let mut form = ScheduleForm::new();
        form.set_frequency(Frequency::Weekly);
        form.set_date(today);
        assert_eq!(form.next_post_date(today), Some(date(2025, 3, 17)));
    }

    #[test]
    fn test_twice_weekly_rejects_third_day() {
        let mut form = ScheduleForm::new();
        form.set_frequency(Frequency::TwicePerWeek);

        assert!(form.toggle_weekday(Weekday::Thu));
        assert!(form.toggle_weekday(Weekday::Mon));
        assert_eq!(form.weekdays(), &[Weekday::Mon, Weekday::Thu]);

        assert!(!form.can_select_weekday(Weekday::Fri));
        assert!(!form.toggle_weekday(Weekday::Fri));
        assert_eq!(form.weekdays().len(), 2);

        assert!(form.toggle_weekday(Weekday::Mon));
        assert!(form.can_select_weekday(Weekday::Fri));
        assert!(form.toggle_weekday(Weekday::Fri));
        assert_eq!(form.weekdays(), &[Weekday::Thu, Weekday::Fri]);
    }

    #[test]
    fn test_twice_weekly_next_post() {
        // 2025-03-10 is a Monday
        let mut form = ScheduleForm::new();
        form.set_frequency(Frequency::TwicePerWeek);
        form.set_date(date(2025, 3, 10));
        form.toggle_weekday(Weekday::Wed);
        assert_eq!(form.next_post_date(date(2025, 3, 10)), None);

        form.toggle_weekday(Weekday::Sun);
        assert_eq!(form.next_post_date(date(2025, 3, 10)), Some(date(2025, 3, 12)));

        form.set_date(date(2025, 3, 13));
        assert_eq!(form.next_post_date(date(2025, 3, 10)), Some(date(2025, 3, 16)));
    }

    #[test]
    fn test_weekend_and_daily_next_post() {
        let mut form = ScheduleForm::new();
        form.set_date(date(2025, 3, 10));
        form.set_frequency(Frequency::Weekend);
        assert_eq!(form.next_post_date(date(2025, 3, 10)), Some(date(2025, 3, 15)));

        form.set_frequency(Frequency::Daily);
        assert_eq!(form.next_post_date(date(2025, 3, 10)), Some(date(2025, 3, 10)));
    }

    #[test]
    fn test_validate_schedule_datetime() {
        let now = at(2025, 3, 10, 12, 0);
        assert!(validate_schedule_datetime("2025-03-10", "12:01", now).is_ok());
        assert!(validate_schedule_datetime("", "12:01", now).is_ok());

        let err = validate_schedule_datetime("2025-03-10", "12:00", now).unwrap_err();
        assert_eq!(err.to_string(), PAST_SCHEDULE_MESSAGE);
        assert!(validate_schedule_datetime("2025-03-09", "23:59:59", now).is_err());
    }

    #[test]
    fn test_form_validation() {
        let now = at(2025, 3, 10, 12, 0);
        let mut form = ScheduleForm::new();
        assert!(form.validate(now).is_ok());

        form.set_mode(PublishMode::Scheduled, now);
        assert!(form.validate(now).is_ok());

        form.set_time(NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert_eq!(form.validate(now).unwrap_err().to_string(), PAST_SCHEDULE_MESSAGE);

        form.set_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        form.set_frequency(Frequency::TwicePerWeek);
        form.toggle_weekday(Weekday::Tue);
        assert_eq!(
            form.validate(now).unwrap_err().to_string(),
            TWICE_WEEKLY_DAYS_MESSAGE
        );
        form.toggle_weekday(Weekday::Fri);
        assert!(form.validate(now).is_ok());
    }

    #[test]
    fn test_scheduled_timestamp() {
        assert_eq!(
            compose_scheduled_timestamp("2025-03-10T00:00:00.000Z", "09:30", "+05:30").as_deref(),
            Some("2025-03-10T09:30:00+05:30")
        );
        assert_eq!(
            compose_scheduled_timestamp("2025-03-10", "09:30:15", "+05:30").as_deref(),
            Some("2025-03-10T09:30:15+05:30")
        );
        assert_eq!(compose_scheduled_timestamp("", "09:30", "+05:30"), None);

        let mut form = ScheduleForm::new();
        assert_eq!(form.scheduled_timestamp("+05:30"), None);
        form.set_mode(PublishMode::Scheduled, at(2025, 3, 10, 8, 0));
        form.set_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(
            form.scheduled_timestamp("+05:30").as_deref(),
            Some("2025-03-10T18:00:00+05:30")
        );
    }

    #[test]
    fn test_preferred_time() {
        assert!(matches!(
            PreferredTime::parse("12:00").unwrap(),
            PreferredTime::Preset(_)
        ));
        let custom = PreferredTime::parse("7:5:9").unwrap();
        assert_eq!(custom, PreferredTime::Custom(NaiveTime::from_hms_opt(7, 5, 9).unwrap()));
        assert!(PreferredTime::parse("noon").is_err());

        let mut form = ScheduleForm::new();
        form.set_preferred_time(PreferredTime::parse("21:00").unwrap());
        assert_eq!(form.time, NaiveTime::from_hms_opt(21, 0, 0));
    }

    #[test]
    fn test_12_24_hour_conversion() {
        assert_eq!(to_12_hour("00:15").unwrap(), (12, 15, "AM"));
        assert_eq!(to_12_hour("12:00").unwrap(), (12, 0, "PM"));
        assert_eq!(to_12_hour("18:45").unwrap(), (6, 45, "PM"));
        assert_eq!(to_24_hour(12, 0, "AM").unwrap(), "00:00");
        assert_eq!(to_24_hour(12, 30, "pm").unwrap(), "12:30");
        assert_eq!(to_24_hour(6, 45, "PM").unwrap(), "18:45");
        assert!(to_24_hour(13, 0, "PM").is_err());
        assert!(to_24_hour(1, 0, "XM").is_err());
    }

    #[test]
    fn test_to_date_only_string() {
        assert_eq!(to_date_only_string("2025-03-10T18:30:00Z"), "2025-03-10");
        assert_eq!(to_date_only_string("2025"), "2025");
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("2perweek".parse::<Frequency>().unwrap(), Frequency::TwicePerWeek);
        assert_eq!("Weekend".parse::<Frequency>().unwrap(), Frequency::Weekend);
        assert!("hourly".parse::<Frequency>().is_err());
        assert_eq!(
            serde_json::to_value(Frequency::TwicePerWeek).unwrap(),
            serde_json::json!("2perweek")
        );
    }

    #[test]
    fn test_parse_schedule() {
        let now = Local.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let in_two_hours = parse_schedule("2h", now).unwrap();
        assert_eq!(in_two_hours, at(2025, 3, 10, 14, 0));

        let absolute = parse_schedule("2025-03-11 09:30", now).unwrap();
        assert_eq!(absolute, at(2025, 3, 11, 9, 30));

        assert!(parse_schedule("", now).is_err());
        assert!(parse_schedule("whenever you like", now).is_err());
    }
}
