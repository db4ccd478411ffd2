//! crates/placement_core/src/calendar.rs
//!
//! iCalendar export of the generated study schedule.

use chrono::{DateTime, Utc};

use crate::domain::DomainSelection;
use crate::error::{require, GuidanceResult};

const PRODUCT_ID: &str = "-//PlacementPro//Study Schedule//EN";

/// Renders a one-event calendar whose description is the schedule text.
pub fn schedule_calendar(
    domains: &DomainSelection,
    schedule: &str,
    now: DateTime<Utc>,
) -> GuidanceResult<String> {
    require(schedule, "Schedule")?;

    let stamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let summary = if domains.is_empty() {
        "Study Schedule".to_string()
    } else {
        domains.joined()
    };

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@placementpro", now.timestamp_millis()),
        format!("DTSTAMP:{}", stamp),
        format!("DTSTART:{}", stamp),
        format!("SUMMARY:{}", escape_text(&summary)),
        format!("DESCRIPTION:{}", escape_text(schedule)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    Ok(lines
        .iter()
        .map(|line| fold_line(line))
        .collect::<Vec<_>>()
        .join("\r\n")
        + "\r\n")
}

/// Content lines longer than 75 octets continue on the next line after a
/// CRLF and a single space. Splits never fall inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    let mut folded = String::with_capacity(line.len() + line.len() / LIMIT * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > LIMIT {
            folded.push_str("\r\n ");
            // The leading space counts toward the continuation line.
            width = 1;
        }
        folded.push(c);
        width += len;
    }
    folded
}

/// RFC 5545 TEXT escaping.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_a_single_event() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let domains: DomainSelection = ["DevOps"].into_iter().collect();

        let ics = schedule_calendar(&domains, "Week 1\nLinux basics", now).unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains(&format!("UID:{}@placementpro\r\n", now.timestamp_millis())));
        assert!(ics.contains("DTSTART:20260302T093000Z\r\n"));
        assert!(ics.contains("SUMMARY:DevOps\r\n"));
        assert!(ics.contains("DESCRIPTION:Week 1\\nLinux basics\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn summary_commas_are_escaped() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let domains: DomainSelection = ["IOT", "DevOps"].into_iter().collect();

        let ics = schedule_calendar(&domains, "x", now).unwrap();
        assert!(ics.contains("SUMMARY:IOT\\, DevOps\r\n"));
    }

    #[test]
    fn long_description_is_folded_at_75_octets() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let schedule = "é".repeat(60) + &"x".repeat(100);

        let ics = schedule_calendar(&DomainSelection::new(), &schedule, now).unwrap();

        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {} octets", line.len());
        }
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("DESCRIPTION:{}\r\n", schedule)));
        assert!(unfolded.contains("SUMMARY:Study Schedule\r\n"));
    }

    #[test]
    fn blank_schedule_is_rejected() {
        assert!(schedule_calendar(&DomainSelection::new(), " ", Utc::now()).is_err());
    }
}
