use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The two people whose weight is tracked. The set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    Me,
    Partner,
}

impl Person {
    pub const ALL: [Person; 2] = [Person::Me, Person::Partner];

    pub fn id(self) -> &'static str {
        match self {
            Person::Me => "me",
            Person::Partner => "partner",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Person::Me => "Zack Chen",
            Person::Partner => "Aria Luo",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Person::Me => "#3478f6",
            Person::Partner => "#ff5fa2",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Person::Me => "\u{1F464}",
            Person::Partner => "\u{2764}",
        }
    }

    pub fn descriptor(self) -> PersonDescriptor {
        PersonDescriptor {
            id: self.id(),
            label: self.label(),
            color: self.color(),
            icon: self.icon(),
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPerson(pub String);

impl FromStr for Person {
    type Err = UnknownPerson;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Person::ALL
            .into_iter()
            .find(|person| person.id() == s.trim())
            .ok_or_else(|| UnknownPerson(s.to_string()))
    }
}

/// Identifies a stored entry: one per person and calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    pub person: Person,
    pub date: NaiveDate,
}

impl EntryKey {
    pub fn new(person: Person, date: NaiveDate) -> Self {
        Self { person, date }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub person: Person,
    pub date: NaiveDate,
    pub weight: f64,
}

/// One sample of a person's series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

impl WeightPoint {
    pub fn new(date: NaiveDate, weight: f64) -> Self {
        Self { date, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Weight as submitted. Forms send text, API clients may send a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    Number(f64),
    Text(String),
}

impl fmt::Display for WeightInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightInput::Number(value) => write!(f, "{value}"),
            WeightInput::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub weight: WeightInput,
}

#[derive(Debug, Deserialize)]
pub struct WindowRequest {
    pub days: u32,
}

#[derive(Debug, Deserialize)]
pub struct AxisRequest {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Deserialize)]
pub struct ReminderToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisResponse {
    pub min: f64,
    pub max: f64,
    pub stride: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub person: String,
    pub label: String,
    pub color: String,
    pub series: Vec<WeightPoint>,
    pub moving_average: Vec<WeightPoint>,
    pub latest: Option<f64>,
    pub average: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub window: u32,
    pub windows: Vec<u32>,
    pub axis: AxisResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub enabled: bool,
    pub permission_granted: bool,
    pub hour: u32,
    pub minute: u32,
}
