//! Hierarchical task identifiers
//!
//! A [`TaskPath`] is the dot-delimited WBS position of a task (`"3.2.1"`).
//! The segment count is the depth; the parent is everything but the last
//! segment. Template tasks use the [`Segment::FloorPlaceholder`] segment
//! (written `X`) where the floor number goes, e.g. `"3.X.1"`.
//!
//! Display order is numeric per segment, never lexicographic: `"3.2"` comes
//! before `"3.10"`. Segments that are not numbers order as `0`, and a missing
//! trailing segment on the shorter path also counts as `0`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Literal that marks the floor position in template IDs
pub const FLOOR_PLACEHOLDER: &str = "X";

/// One dot-separated component of a [`TaskPath`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Positive integer position
    Index(u64),
    /// Floor number slot in a typical-floor template
    FloorPlaceholder,
    /// Anything unparseable; kept verbatim for display
    Label(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == FLOOR_PLACEHOLDER {
            return Self::FloorPlaceholder;
        }
        raw.parse::<u64>()
            .map(Self::Index)
            .unwrap_or_else(|_| Self::Label(raw.to_string()))
    }

    /// Numeric value used for ordering (non-numeric segments count as 0)
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::Index(n) => *n,
            _ => 0,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{n}"),
            Self::FloorPlaceholder => f.write_str(FLOOR_PLACEHOLDER),
            Self::Label(s) => f.write_str(s),
        }
    }
}

/// Dot-delimited hierarchical task identifier
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TaskPath {
    segments: Vec<Segment>,
}

impl TaskPath {
    /// Parse a path, trimming surrounding whitespace.
    ///
    /// Never fails: an empty string yields an empty path, and unparseable
    /// segments become [`Segment::Label`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::default();
        }
        Self {
            segments: raw.split('.').map(Segment::parse).collect(),
        }
    }

    /// Build a concrete path from numeric segments
    pub fn from_indices(indices: &[u64]) -> Self {
        Self {
            segments: indices.iter().copied().map(Segment::Index).collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Nesting depth: segment count minus one (0 for top-level tasks)
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Top-level phase number (`3` for `"3.2.1"`)
    pub fn top_level(&self) -> Option<u64> {
        match self.segments.first() {
            Some(Segment::Index(n)) => Some(*n),
            _ => None,
        }
    }

    /// All segments but the last, or `None` at depth 0
    pub fn parent(&self) -> Option<TaskPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Proper-prefix ancestors, outermost first (`"3"`, `"3.2"` for `"3.2.1"`)
    pub fn ancestors(&self) -> impl Iterator<Item = TaskPath> + '_ {
        (1..self.segments.len()).map(move |len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// True when `self` is a proper prefix of `other`
    pub fn is_ancestor_of(&self, other: &TaskPath) -> bool {
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Append a segment
    pub fn child(&self, segment: Segment) -> TaskPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn has_placeholder(&self) -> bool {
        self.segments.contains(&Segment::FloorPlaceholder)
    }

    /// Replace every placeholder segment with the floor number
    pub fn with_floor(&self, floor: u64) -> TaskPath {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| match s {
                    Segment::FloorPlaceholder => Segment::Index(floor),
                    other => other.clone(),
                })
                .collect(),
        }
    }

    /// Insert the floor number right after the top-level segment.
    ///
    /// Used for template tasks that were flagged by name but carry no
    /// placeholder (`"3.5"` becomes `"3.<floor>.5"`).
    pub fn rebased_under_floor(&self, floor: u64) -> TaskPath {
        let mut segments = self.segments.clone();
        let at = segments.len().min(1);
        segments.insert(at, Segment::Index(floor));
        Self { segments }
    }

    /// Numeric segment-by-segment comparison used for display order.
    ///
    /// Paths that differ only in non-numeric segments, or by trailing zeros,
    /// compare equal here; a stable sort keeps their input order.
    pub fn display_cmp(&self, other: &TaskPath) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).map_or(0, Segment::ordinal);
            let b = other.segments.get(i).map_or(0, Segment::ordinal);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

/// Free-function form of [`TaskPath::display_cmp`] for `sort_by`
pub fn compare(a: &TaskPath, b: &TaskPath) -> Ordering {
    a.display_cmp(b)
}

// Total order consistent with `Eq`: display order first, then segment count,
// then the textual form.
impl Ord for TaskPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.display_cmp(other)
            .then_with(|| self.segments.len().cmp(&other.segments.len()))
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl PartialOrd for TaskPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for TaskPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for TaskPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for TaskPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Oracle output sometimes carries IDs as JSON numbers (`3` or `1.2`)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPath {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for TaskPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPath::deserialize(deserializer)? {
            RawPath::Text(s) => Self::parse(&s),
            RawPath::Integer(n) => Self::from_indices(&[n]),
            RawPath::Float(x) => Self::parse(&x.to_string()),
        })
    }
}
