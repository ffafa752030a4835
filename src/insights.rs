use crate::models::MoodEntry;
use crate::stats::mean;
use chrono::{TimeZone, Timelike};

/// Number of most recent entries the insight rules look at.
pub const INSIGHT_SAMPLE: usize = 10;

const MIN_ENTRIES: usize = 2;
const PATTERN_SHARE: f64 = 0.6;
const IMPROVEMENT_MIN_ENTRIES: usize = 6;
const IMPROVEMENT_THRESHOLD: f64 = 0.5;
const LOW_MOOD: u8 = 2;
const UNKNOWN_HOUR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight {
    MorningPattern,
    EveningPattern,
    Improving,
    HardStreak,
}

impl Insight {
    /// Rules in the order their observations are listed.
    pub const ALL: [Insight; 4] = [
        Insight::MorningPattern,
        Insight::EveningPattern,
        Insight::Improving,
        Insight::HardStreak,
    ];

    pub const fn message(self) -> &'static str {
        match self {
            Insight::MorningPattern => {
                "You mostly check in during the morning. Starting the day with reflection is a great habit."
            }
            Insight::EveningPattern => {
                "Most of your check-ins happen in the evening. Winding down this way can help you rest."
            }
            Insight::Improving => {
                "Your mood has been lifting over your last few check-ins. Keep it up!"
            }
            Insight::HardStreak => {
                "The last two check-ins have been difficult. Be gentle with yourself, and consider reaching out to someone you trust."
            }
        }
    }

    fn detect<Tz: TimeZone>(self, sample: &[MoodEntry], tz: &Tz) -> bool {
        match self {
            Insight::MorningPattern => share_in_hours(sample, tz, 5..11) > PATTERN_SHARE,
            Insight::EveningPattern => share_in_hours(sample, tz, 17..23) > PATTERN_SHARE,
            Insight::Improving => {
                if sample.len() < IMPROVEMENT_MIN_ENTRIES {
                    return false;
                }
                let last3 = mean(&values(&sample[0..3]));
                let prev3 = mean(&values(&sample[3..6]));
                last3 - prev3 >= IMPROVEMENT_THRESHOLD
            }
            Insight::HardStreak => sample
                .get(..2)
                .is_some_and(|pair| pair.iter().all(|entry| entry.mood.value() <= LOW_MOOD)),
        }
    }
}

/// Heuristic observations over the most recent entries, evaluated lazily
/// in [`Insight::ALL`] order. Rules are independent, so several may fire.
/// Local hours are taken in `tz`.
pub fn build_insights<'a, Tz: TimeZone>(
    entries: &'a [MoodEntry],
    tz: &'a Tz,
) -> impl Iterator<Item = Insight> + 'a {
    let sample: &[MoodEntry] = if entries.len() < MIN_ENTRIES {
        &[]
    } else {
        &entries[..entries.len().min(INSIGHT_SAMPLE)]
    };

    Insight::ALL
        .into_iter()
        .filter(move |insight| !sample.is_empty() && insight.detect(sample, tz))
}

fn values(entries: &[MoodEntry]) -> Vec<f64> {
    entries.iter().map(|entry| f64::from(entry.mood.value())).collect()
}

fn local_hour<Tz: TimeZone>(entry: &MoodEntry, tz: &Tz) -> u32 {
    entry
        .timestamp
        .map(|ts| ts.with_timezone(tz).hour())
        .unwrap_or(UNKNOWN_HOUR)
}

fn share_in_hours<Tz: TimeZone>(sample: &[MoodEntry], tz: &Tz, hours: std::ops::Range<u32>) -> f64 {
    let hits = sample
        .iter()
        .filter(|entry| hours.contains(&local_hour(entry, tz)))
        .count();
    hits as f64 / sample.len() as f64
}
