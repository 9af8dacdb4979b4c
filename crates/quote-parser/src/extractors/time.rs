// Ceremony time: a clock range, a single clock time or a Korean hour phrase
use std::fmt;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::FieldExtractor;

lazy_static! {
    static ref CLOCK_RANGE: Regex =
        Regex::new(r"(\d{1,2})\s*:\s*(\d{2})\s*[~\-–—]\s*(\d{1,2})\s*:\s*(\d{2})").unwrap();
    static ref CLOCK: Regex = Regex::new(r"(\d{1,2})\s*:\s*(\d{2})").unwrap();
    /// "오후 2시", "오전 11시 30분"
    static ref HOUR_PHRASE: Regex =
        Regex::new(r"(오전|오후)?\s*(\d{1,2})\s*시(?:\s*(\d{1,2})\s*분)?").unwrap();
    /// "오전 11시반"
    static ref HALF_HOUR_PHRASE: Regex = Regex::new(r"(오전|오후)?\s*(\d{1,2})\s*시\s*반").unwrap();
}

/// Ceremonies are only held between these times, inclusive
const EARLIEST_MINUTE: u32 = 10 * 60;
const LATEST_MINUTE: u32 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    fn minutes(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn is_ceremony_hour(&self) -> bool {
        (EARLIEST_MINUTE..=LATEST_MINUTE).contains(&self.minutes())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn group(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn clock(caps: &Captures<'_>, hour: usize, minute: usize) -> Option<ClockTime> {
    ClockTime::new(group(caps, hour)?, group(caps, minute)?)
}

/// Apply the 오전/오후 marker to a 12-hour reading
fn meridiem_hour(marker: Option<&str>, hour: u32) -> u32 {
    match marker {
        Some("오후") if hour < 12 => hour + 12,
        Some("오전") if hour == 12 => 0,
        _ => hour,
    }
}

fn ceremony(time: Option<ClockTime>) -> Option<ClockTime> {
    time.filter(ClockTime::is_ceremony_hour)
}

/// Read a ceremony time from one line.
///
/// The first notation present decides; a time outside ceremony hours
/// rejects the whole line.
pub fn parse_time_line(line: &str) -> Option<String> {
    if let Some(caps) = CLOCK_RANGE.captures(line) {
        let start = ceremony(clock(&caps, 1, 2))?;
        let end = ceremony(clock(&caps, 3, 4))?;
        return Some(format!("{}~{}", start, end));
    }

    if let Some(caps) = CLOCK.captures(line) {
        return ceremony(clock(&caps, 1, 2)).map(|t| t.to_string());
    }

    if let Some(caps) = HOUR_PHRASE.captures(line) {
        let end = caps.get(0).map(|m| m.end()).unwrap_or(line.len());
        let rest = line[end..].trim_start();
        // "11시반" belongs to the half-hour notation, "2시간" is a duration
        if !rest.starts_with('반') && !(caps.get(3).is_none() && rest.starts_with('간')) {
            let marker = caps.get(1).map(|m| m.as_str());
            let hour = meridiem_hour(marker, group(&caps, 2)?);
            let minute = group(&caps, 3).unwrap_or(0);
            return ceremony(ClockTime::new(hour, minute)).map(|t| t.to_string());
        }
    }

    if let Some(caps) = HALF_HOUR_PHRASE.captures(line) {
        let marker = caps.get(1).map(|m| m.as_str());
        let hour = meridiem_hour(marker, group(&caps, 2)?);
        return ceremony(ClockTime::new(hour, 30)).map(|t| t.to_string());
    }

    None
}

/// First line carrying a valid ceremony time
pub struct TimeExtractor;

impl FieldExtractor for TimeExtractor {
    type Output = String;

    fn extract(&self, lines: &[String]) -> Option<String> {
        lines.iter().find_map(|line| parse_time_line(line))
    }
}
