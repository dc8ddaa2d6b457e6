//! # Announcement Parsing
//!
//! Turns raw message text like `Auction 7: Shield in 2 hours` into a structured announcement.
//! Parsing yields a `DeadlineSpec`; resolution to an absolute timestamp is a separate pure step
//! so tests can pin the clock.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use regex::Regex;

use crate::domain::types::DeadlineSpec;

/// Announcement as written, deadline not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnnouncement {
    pub lot_number: String,
    pub item_description: String,
    pub deadline: DeadlineSpec,
}

/// Announcement with its deadline resolved against a clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub lot_number: String,
    pub item_description: String,
    pub deadline: Option<DateTime<Utc>>,
}

pub struct AnnouncementParser {
    header: Regex,
    relative: Regex,
    absolute: Regex,
    placeholder_lot: String,
    timezone: FixedOffset,
}

impl AnnouncementParser {
    pub fn new(
        keywords: &[String],
        placeholder_lot: &str,
        timezone: FixedOffset,
    ) -> Result<Self, regex::Error> {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k.trim()))
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join("|");

        // Keyword, optional lot number, colon, description up to the end of its line
        let header = Regex::new(&format!(r"(?i)^(?:{alternation})\s*(\d+)?\s*:\s*(.+)"))?;
        let relative = Regex::new(r"(?i)^(.*\S)\s+in\s+(\d+)\s+hours?$")?;
        let absolute = Regex::new(r"(?i)^(.*\S)\s+at\s+(\d{1,2}):(\d{2})$")?;

        Ok(Self {
            header,
            relative,
            absolute,
            placeholder_lot: placeholder_lot.to_string(),
            timezone,
        })
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    /// Returns `None` when the text is not an announcement.
    ///
    /// Only the line holding the keyword is read; later lines are free text.
    pub fn parse(&self, text: &str) -> Option<ParsedAnnouncement> {
        let (lot_number, description) = self.header_line(text)?;
        let (item, deadline) = self.split_deadline(description);
        Some(ParsedAnnouncement {
            lot_number,
            item_description: item.trim().to_string(),
            deadline,
        })
    }

    /// Parses and resolves the deadline against `now` in one step.
    ///
    /// A clause that cannot be resolved (a relative deadline past the representable
    /// range) is not a deadline: it stays in the description.
    pub fn parse_at(&self, text: &str, now: DateTime<Utc>) -> Option<Announcement> {
        let (lot_number, description) = self.header_line(text)?;
        let (item, spec) = self.split_deadline(description);
        let (item, deadline) = match resolve_deadline(spec, now, self.timezone) {
            None if spec != DeadlineSpec::NoDeadline => {
                tracing::debug!("Deadline {:?} is out of range, keeping it as text", spec);
                (description, None)
            }
            deadline => (item, deadline),
        };
        Some(Announcement {
            lot_number,
            item_description: item.trim().to_string(),
            deadline,
        })
    }

    fn header_line<'a>(&self, text: &'a str) -> Option<(String, &'a str)> {
        let caps = self.header.captures(text)?;
        let lot_number = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| self.placeholder_lot.clone());
        let description = caps.get(2)?.as_str().trim();
        if description.is_empty() {
            return None;
        }
        Some((lot_number, description))
    }

    fn split_deadline<'a>(&self, description: &'a str) -> (&'a str, DeadlineSpec) {
        if let Some(caps) = self.relative.captures(description)
            && let (Some(item), Some(hours)) = (caps.get(1), caps.get(2))
            && let Ok(hours) = hours.as_str().parse::<u32>()
        {
            return (item.as_str(), DeadlineSpec::RelativeDeadline { hours });
        }

        if let Some(caps) = self.absolute.captures(description)
            && let (Some(item), Some(hour), Some(minute)) = (caps.get(1), caps.get(2), caps.get(3))
            && let (Ok(hour), Ok(minute)) = (hour.as_str().parse::<u32>(), minute.as_str().parse::<u32>())
            && hour < 24
            && minute < 60
        {
            return (item.as_str(), DeadlineSpec::AbsoluteDeadline { hour, minute });
        }

        (description, DeadlineSpec::NoDeadline)
    }
}

/// Resolves a deadline clause to an absolute instant.
///
/// Relative clauses count from `now`. Absolute clauses pick the next occurrence of that
/// wall-clock time in `timezone`: today if still ahead, otherwise tomorrow.
pub fn resolve_deadline(
    spec: DeadlineSpec,
    now: DateTime<Utc>,
    timezone: FixedOffset,
) -> Option<DateTime<Utc>> {
    match spec {
        DeadlineSpec::NoDeadline => None,
        DeadlineSpec::RelativeDeadline { hours } => {
            now.checked_add_signed(Duration::try_hours(i64::from(hours))?)
        }
        DeadlineSpec::AbsoluteDeadline { hour, minute } => {
            let local_now = now.with_timezone(&timezone);
            let naive = local_now.date_naive().and_hms_opt(hour, minute, 0)?;
            let mut candidate = timezone.from_local_datetime(&naive).single()?;
            if candidate <= local_now {
                candidate += Duration::days(1);
            }
            Some(candidate.with_timezone(&Utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AnnouncementParser {
        AnnouncementParser::new(
            &["Auction".to_string(), "Аукцион".to_string()],
            "?",
            FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_plain_announcement() {
        let parsed = parser().parse("Auction: Sword").unwrap();
        assert_eq!(parsed.lot_number, "?");
        assert_eq!(parsed.item_description, "Sword");
        assert_eq!(parsed.deadline, DeadlineSpec::NoDeadline);
    }

    #[test]
    fn test_relative_deadline() {
        let now = at(12, 0);
        let ann = parser().parse_at("Auction 7: Shield in 2 hours", now).unwrap();
        assert_eq!(ann.lot_number, "7");
        assert_eq!(ann.item_description, "Shield");
        assert_eq!(ann.deadline, Some(now + Duration::hours(2)));

        let single = parser().parse("Auction 8: Helmet in 1 hour").unwrap();
        assert_eq!(single.deadline, DeadlineSpec::RelativeDeadline { hours: 1 });
    }

    #[test]
    fn test_absolute_deadline_rolls_over_to_tomorrow() {
        let p = parser();
        let late = p.parse_at("Auction 3: Bow at 20:00", at(21, 0)).unwrap();
        assert_eq!(
            late.deadline,
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 20, 0, 0).unwrap())
        );

        let early = p.parse_at("Auction 3: Bow at 20:00", at(19, 0)).unwrap();
        assert_eq!(early.deadline, Some(at(20, 0)));
    }

    #[test]
    fn test_absolute_deadline_in_reference_timezone() {
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let p = AnnouncementParser::new(&["Auction".to_string()], "?", moscow).unwrap();
        // 16:00 UTC is 19:00 in +03:00, so 20:00 local is still today
        let ann = p.parse_at("Auction: Bow at 20:00", at(16, 0)).unwrap();
        assert_eq!(ann.deadline, Some(at(17, 0)));
    }

    #[test]
    fn test_exact_time_is_never_now() {
        let ann = parser().parse_at("Auction: Bow at 20:00", at(20, 0)).unwrap();
        assert!(ann.deadline.unwrap() > at(20, 0));
    }

    #[test]
    fn test_case_insensitive_and_localized_keyword() {
        let p = parser();
        assert_eq!(p.parse("AUCTION 2: Axe").unwrap().lot_number, "2");
        let ru = p.parse("аукцион 10: Клетка атаки сила").unwrap();
        assert_eq!(ru.lot_number, "10");
        assert_eq!(ru.item_description, "Клетка атаки сила");
    }

    #[test]
    fn test_description_is_trimmed() {
        let parsed = parser().parse("Auction 5:    Golden Ring   ").unwrap();
        assert_eq!(parsed.item_description, "Golden Ring");
    }

    #[test]
    fn test_invalid_time_stays_in_description() {
        let parsed = parser().parse("Auction: Lamp at 25:00").unwrap();
        assert_eq!(parsed.item_description, "Lamp at 25:00");
        assert_eq!(parsed.deadline, DeadlineSpec::NoDeadline);
    }

    #[test]
    fn test_no_match() {
        let p = parser();
        assert!(p.parse("hello there").is_none());
        assert!(p.parse("Auctions: plural").is_none());
        assert!(p.parse("Auction:   ").is_none());
        assert!(p.parse("Let's do an Auction: later").is_none());
    }

    #[test]
    fn test_only_first_line_is_read() {
        let p = parser();
        let parsed = p.parse("Auction 1: Sword\nbring gold, ends soon").unwrap();
        assert_eq!(parsed.item_description, "Sword");
        assert_eq!(parsed.deadline, DeadlineSpec::NoDeadline);

        let now = at(12, 0);
        let ann = p.parse_at("Auction: Sword in 2 hours\nsee rules at 10:00", now).unwrap();
        assert_eq!(ann.item_description, "Sword");
        assert_eq!(ann.deadline, Some(now + Duration::hours(2)));
    }

    #[test]
    fn test_unrepresentable_relative_deadline_stays_in_description() {
        let ann = parser()
            .parse_at("Auction 1: Sword in 3000000000 hours", at(12, 0))
            .unwrap();
        assert_eq!(ann.item_description, "Sword in 3000000000 hours");
        assert_eq!(ann.deadline, None);

        let overflow = DeadlineSpec::RelativeDeadline { hours: u32::MAX };
        assert_eq!(resolve_deadline(overflow, at(12, 0), FixedOffset::east_opt(0).unwrap()), None);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let p = parser();
        let now = at(9, 30);
        let text = "Auction 4: Staff at 10:15";
        assert_eq!(p.parse_at(text, now), p.parse_at(text, now));
    }
}
