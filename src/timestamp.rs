//! Timestamp fields that may hold a status word instead of a date.
//!
//! Several Workbrew records report "this hasn't happened yet" by putting a
//! word such as `"Never"` or `"Not Started"` in a field that otherwise holds
//! an RFC3339 timestamp. [`TemporalValue`] models that field as a tagged
//! union over a closed [`Sentinel`] set, so one type covers every variant.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BrewError;

/// A closed set of status words a temporal field may carry.
pub trait Sentinel: Copy + Eq + fmt::Debug + 'static {
    /// Every recognized member, in wire order.
    const ALL: &'static [Self];

    /// The member meaning "this never happened". Also the zero value.
    const NEVER: Self;

    /// The exact wire text of this member.
    fn as_str(&self) -> &'static str;

    /// Look up a member by its wire text.
    fn from_wire(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == text)
    }
}

/// The single-word status set used by "last seen" style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeverStatus {
    /// `"Never"`
    Never,
}

impl Sentinel for NeverStatus {
    const ALL: &'static [Self] = &[Self::Never];
    const NEVER: Self = Self::Never;

    fn as_str(&self) -> &'static str {
        "Never"
    }
}

/// The status set used by fields that track a run in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStatus {
    /// `"Never"`
    Never,
    /// `"Not Started"`
    NotStarted,
    /// `"Not Finished"`
    NotFinished,
}

impl Sentinel for ProgressStatus {
    const ALL: &'static [Self] = &[Self::Never, Self::NotStarted, Self::NotFinished];
    const NEVER: Self = Self::Never;

    fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "Never",
            Self::NotStarted => "Not Started",
            Self::NotFinished => "Not Finished",
        }
    }
}

/// Either a point in time or a status word explaining why there isn't one.
///
/// Parsed from and rendered back to the same wire text. Timestamps are held
/// in UTC and rendered as RFC3339 with a `Z` suffix; fractional seconds are
/// only written when present.
///
/// # Example
///
/// ```
/// use brewapi::{LastSeen, NeverStatus};
///
/// let seen: LastSeen = "2023-11-01T12:34:56Z".parse().unwrap();
/// assert!(seen.has_timestamp());
///
/// let never: LastSeen = "Never".parse().unwrap();
/// assert!(never.is_status(NeverStatus::Never));
/// assert_eq!(never.to_string(), "Never");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalValue<S: Sentinel> {
    /// A real instant.
    Timestamp(DateTime<Utc>),
    /// A status word from the field's sentinel set.
    Status(S),
}

/// A timestamp that may be `"Never"`.
pub type LastSeen = TemporalValue<NeverStatus>;

/// A timestamp that may be `"Never"`, `"Not Started"` or `"Not Finished"`.
pub type ProgressTimestamp = TemporalValue<ProgressStatus>;

impl<S: Sentinel> TemporalValue<S> {
    /// Parse wire text, trying the sentinel set before RFC3339.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::MalformedTemporalValue`] if the text is neither.
    /// The empty string is rejected the same way.
    pub fn parse(raw: &str) -> Result<Self, BrewError> {
        let text = raw
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(raw);

        if let Some(status) = S::from_wire(text) {
            return Ok(Self::Status(status));
        }

        DateTime::parse_from_rfc3339(text)
            .map(|dt| Self::Timestamp(dt.with_timezone(&Utc)))
            .map_err(|_| BrewError::MalformedTemporalValue(text.to_string()))
    }

    /// Whether this value is the given status word.
    pub fn is_status(&self, status: S) -> bool {
        matches!(self, Self::Status(s) if *s == status)
    }

    /// Whether this value is the "never" status word.
    pub fn is_never(&self) -> bool {
        self.is_status(S::NEVER)
    }

    /// Whether a parsed instant is present.
    pub fn has_timestamp(&self) -> bool {
        matches!(self, Self::Timestamp(_))
    }

    /// The instant, if present.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(dt) => Some(*dt),
            Self::Status(_) => None,
        }
    }

    /// The status word, if present.
    pub fn status(&self) -> Option<S> {
        match self {
            Self::Status(s) => Some(*s),
            Self::Timestamp(_) => None,
        }
    }

    /// Text for display; identical to what serialization emits.
    pub fn display_string(&self) -> String {
        match self {
            Self::Status(s) => s.as_str().to_string(),
            Self::Timestamp(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl TemporalValue<ProgressStatus> {
    /// Whether this value is `"Not Started"`.
    pub fn is_not_started(&self) -> bool {
        self.is_status(ProgressStatus::NotStarted)
    }

    /// Whether this value is `"Not Finished"`.
    pub fn is_not_finished(&self) -> bool {
        self.is_status(ProgressStatus::NotFinished)
    }
}

impl<S: Sentinel> Default for TemporalValue<S> {
    fn default() -> Self {
        Self::Status(S::NEVER)
    }
}

impl<S: Sentinel> From<DateTime<Utc>> for TemporalValue<S> {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt)
    }
}

impl<S: Sentinel> FromStr for TemporalValue<S> {
    type Err = BrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<S: Sentinel> fmt::Display for TemporalValue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl<S: Sentinel> Serialize for TemporalValue<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(&self.display_string())
    }
}

impl<'de, S: Sentinel> Deserialize<'de> for TemporalValue<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TemporalVisitor<S>(PhantomData<S>);

        impl<S: Sentinel> Visitor<'_> for TemporalVisitor<S> {
            type Value = TemporalValue<S>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let words: Vec<&str> = S::ALL.iter().map(Sentinel::as_str).collect();
                write!(f, "an RFC3339 timestamp or one of {words:?}")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                TemporalValue::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TemporalVisitor(PhantomData))
    }
}
