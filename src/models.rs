use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mood {
    Angry,
    Sad,
    Neutral,
    Good,
    Great,
}

// value() and from_value() must stay inverse of each other.
const _: () = {
    let mut i = 0;
    while i < Mood::ALL.len() {
        let value = Mood::ALL[i].value();
        assert!(value as usize == i + 1);
        match Mood::from_value(value) {
            Some(mood) => assert!(mood as usize == i),
            None => panic!("mood value has no inverse"),
        }
        i += 1;
    }
};

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Angry, Mood::Sad, Mood::Neutral, Mood::Good, Mood::Great];

    pub const fn value(self) -> u8 {
        match self {
            Mood::Angry => 1,
            Mood::Sad => 2,
            Mood::Neutral => 3,
            Mood::Good => 4,
            Mood::Great => 5,
        }
    }

    pub const fn from_value(value: u8) -> Option<Mood> {
        match value {
            1 => Some(Mood::Angry),
            2 => Some(Mood::Sad),
            3 => Some(Mood::Neutral),
            4 => Some(Mood::Good),
            5 => Some(Mood::Great),
            _ => None,
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Mood::Angry => "😡",
            Mood::Sad => "😔",
            Mood::Neutral => "😐",
            Mood::Good => "🙂",
            Mood::Great => "🤩",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Mood::Angry => "Angry",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Good => "Good",
            Mood::Great => "Great",
        }
    }

    /// Accepts either the emoji token or the label, case-insensitively.
    pub fn from_token(token: &str) -> Option<Mood> {
        let token = token.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.emoji() == token || mood.label().eq_ignore_ascii_case(token))
    }

    /// Micro-suggestion shown after a successful check-in.
    pub const fn suggestion(self) -> &'static str {
        match self {
            Mood::Sad => {
                "Take a slow breath: in for 4 seconds, hold for 4, out for 4. Repeat it three times."
            }
            Mood::Angry => {
                "Pick one small win you can finish in five minutes, then give yourself credit for it."
            }
            Mood::Good | Mood::Great => {
                "Love that! Take a second to notice what went right and celebrate it."
            }
            Mood::Neutral => {
                "Take a moment to center yourself. What is one thing you are grateful for right now?"
            }
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized mood token: {0:?}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Mood::from_token(token).ok_or_else(|| UnknownMood(token.to_string()))
    }
}

impl TryFrom<String> for Mood {
    type Error = UnknownMood;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        mood.emoji().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub mood: Mood,
    #[serde(default)]
    pub note: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub mood: Mood,
    pub note: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub average: String,
    pub average_color: &'static str,
    pub best: Mood,
    pub worst: Mood,
    pub trend: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub session: &'static str,
    pub user: Option<Identity>,
    pub loading_entries: bool,
    pub entries: Vec<MoodEntry>,
    pub draft_mood: Option<Mood>,
    pub draft_note: String,
    pub is_submitting: bool,
    pub suggestion: Option<&'static str>,
    pub sync_error: Option<String>,
    pub notice: Option<String>,
    pub pending_delete: Option<String>,
    pub stats: Option<StatsResponse>,
    pub insights: Vec<&'static str>,
}
