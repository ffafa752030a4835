use crate::models::{Mood, MoodEntry, StatsResponse};

/// Number of most recent entries the stats card summarizes.
pub const STATS_WINDOW: usize = 7;

const TREND_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Declining,
    Flat,
}

impl Trend {
    pub const fn symbol(self) -> &'static str {
        match self {
            Trend::Improving => "↗️",
            Trend::Declining => "↘️",
            Trend::Flat => "➡️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodColor {
    Positive,
    Caution,
    Negative,
}

impl MoodColor {
    pub const fn css(self) -> &'static str {
        match self {
            MoodColor::Positive => "#4caf50",
            MoodColor::Caution => "#ffc107",
            MoodColor::Negative => "#ff6b6b",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodStats {
    pub average: f64,
    pub min: Mood,
    pub max: Mood,
    pub trend: Trend,
    pub color: MoodColor,
    pub count: usize,
}

impl MoodStats {
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }

    pub fn to_response(&self) -> StatsResponse {
        StatsResponse {
            average: self.average_label(),
            average_color: self.color.css(),
            best: self.max,
            worst: self.min,
            trend: self.trend.symbol(),
            count: self.count,
        }
    }
}

/// Orders entries newest first. Entries still waiting for a server timestamp
/// count as the epoch and sink to the end. The sort is stable.
pub fn sort_entries(entries: &mut [MoodEntry]) {
    entries.sort_by_key(|entry| std::cmp::Reverse(sort_key(entry)));
}

/// Seconds and nanoseconds since the epoch; zero when unstamped.
fn sort_key(entry: &MoodEntry) -> (i64, u32) {
    entry
        .timestamp
        .map_or((0, 0), |ts| (ts.timestamp(), ts.timestamp_subsec_nanos()))
}

/// Summarizes the recency window of an already sorted entry list.
///
/// The trend compares the first `min(3, ceil(n / 2))` values against the
/// rest. Because the list is newest first, the front slice holds the most
/// recent entries: a positive difference means the latest check-ins are
/// better than the older ones.
pub fn build_stats(entries: &[MoodEntry]) -> Option<MoodStats> {
    let window = &entries[..entries.len().min(STATS_WINDOW)];
    if window.is_empty() {
        return None;
    }

    let values: Vec<f64> = window.iter().map(|entry| f64::from(entry.mood.value())).collect();
    let average = mean(&values);

    let min = window.iter().map(|entry| entry.mood).min()?;
    let max = window.iter().map(|entry| entry.mood).max()?;

    let front_len = values.len().div_ceil(2).min(3);
    let (front, back) = values.split_at(front_len);
    let front_mean = mean(front);
    let back_mean = if back.is_empty() { front_mean } else { mean(back) };
    let diff = front_mean - back_mean;

    let trend = if diff >= TREND_THRESHOLD {
        Trend::Improving
    } else if diff <= -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Flat
    };

    let color = if average >= 4.0 {
        MoodColor::Positive
    } else if average >= 2.5 {
        MoodColor::Caution
    } else {
        MoodColor::Negative
    };

    Some(MoodStats {
        average,
        min,
        max,
        trend,
        color,
        count: window.len(),
    })
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
