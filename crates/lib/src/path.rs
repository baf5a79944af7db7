//! Path types for addressing nodes in a store tree.
//!
//! A node is addressed by a [`Path`]: an ordered list of [`Segment`]s, each
//! either an object key or an array index. Paths have two derived forms:
//!
//! - the *display path*, a single string such as `items[0].name`, used as the
//!   subscription topic for the node;
//! - the [`StoragePath`], which interleaves a `"value"` token before every
//!   segment and mirrors how child nodes sit under their parent's value.
//!
//! # Usage
//!
//! ```rust
//! use pathstore::path;
//! use pathstore::path::Path;
//! use std::str::FromStr;
//!
//! let path = path!["items", 0, "name"];
//! assert_eq!(path.to_display_path(), "items[0].name");
//!
//! // Dotted numbers stay object keys, bracketed numbers become indices
//! let keyed = Path::from_str("items.23.name").unwrap();
//! assert_eq!(keyed, path!["items", "23", "name"]);
//! ```

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token separating a node from its children in a [`StoragePath`].
pub const VALUE_TOKEN: &str = "value";

/// Matches a dot-chunk of the form `name[digits]`.
static INDEXED_CHUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\[(\d+)\]$").expect("Invalid indexed chunk regex"));

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Position inside an array node
    Index(usize),
    /// Key inside an object node
    Key(String),
}

impl Segment {
    /// Returns the key if this segment addresses an object child.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    /// Returns the index if this segment addresses an array child.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            Segment::Key(_) => None,
        }
    }

    /// Returns true if this segment addresses an array child.
    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    fn value_token() -> Self {
        Segment::Key(VALUE_TOKEN.to_string())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Key(key) => write!(f, "{key}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<&String> for Segment {
    fn from(key: &String) -> Self {
        Segment::Key(key.clone())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Integer literals default to `i32`; negative indices saturate to 0.
impl From<i32> for Segment {
    fn from(index: i32) -> Self {
        Segment::Index(usize::try_from(index).unwrap_or(0))
    }
}

/// An owned path to a node in the store tree.
///
/// The empty path addresses the root node.
///
/// # Examples
///
/// ```rust
/// # use pathstore::path::Path;
/// let path = Path::new().push("friends").push(1).push("name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "friends[1].name");
/// assert_eq!(path.parent().unwrap().to_string(), "friends[1]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Creates the root path.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a path from a list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Adds a segment to the end of this path.
    pub fn push(mut self, segment: impl Into<Segment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Returns a new path with `segment` appended, leaving `self` untouched.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        self.clone().push(segment)
    }

    /// Joins this path with another path.
    pub fn join(&self, other: impl AsRef<Path>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.as_ref().segments.iter().cloned());
        Self { segments }
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns the last segment, or `None` for the root.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Renders the display path.
    ///
    /// Keys are joined with `.` (no leading dot), indices are rendered as
    /// `[n]`. The root renders as the empty string.
    ///
    /// ```rust
    /// # use pathstore::path;
    /// assert_eq!(path!["items", 0, "nested", "name"].to_display_path(), "items[0].nested.name");
    /// assert_eq!(path![].to_display_path(), "");
    /// ```
    pub fn to_display_path(&self) -> String {
        let mut out = String::new();
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
                Segment::Key(key) => {
                    if position > 0 {
                        out.push('.');
                    }
                    out.push_str(key);
                }
            }
        }
        out
    }

    /// Parses a display path.
    ///
    /// The input is split on `.` first. A chunk of the form `name[digits]`
    /// becomes a key followed by an index; every other chunk, including a
    /// purely numeric one, stays a key. The empty string is the root path.
    /// Malformed bracket syntax is not rejected, it simply stays a key.
    pub fn from_display_path(display: &str) -> Self {
        if display.is_empty() {
            return Self::new();
        }

        let mut segments = Vec::new();
        for chunk in display.split('.') {
            let indexed = INDEXED_CHUNK.captures(chunk).and_then(|captures| {
                let index = captures[2].parse::<usize>().ok()?;
                Some((captures[1].to_string(), index))
            });

            match indexed {
                Some((key, index)) => {
                    segments.push(Segment::Key(key));
                    segments.push(Segment::Index(index));
                }
                None => segments.push(Segment::Key(chunk.to_string())),
            }
        }
        Self { segments }
    }

    /// Converts this path into the storage-tree traversal path.
    ///
    /// ```rust
    /// # use pathstore::path;
    /// # use pathstore::path::Segment;
    /// let storage = path!["set", 0].to_storage_path();
    /// assert_eq!(
    ///     storage.segments(),
    ///     &[Segment::from("value"), Segment::from("set"), Segment::from("value"), Segment::Index(0)]
    /// );
    /// ```
    pub fn to_storage_path(&self) -> StoragePath {
        let mut segments = Vec::with_capacity(self.segments.len() * 2);
        for segment in &self.segments {
            segments.push(Segment::value_token());
            segments.push(segment.clone());
        }
        StoragePath { segments }
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_display_path(s))
    }
}

/// Formats as the display path.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_path())
    }
}

/// Internal traversal path with a `"value"` token before every segment.
///
/// Only produced by [`Path::to_storage_path`], so it is always well formed:
/// even length, with the token at every even position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StoragePath {
    segments: Vec<Segment>,
}

impl StoragePath {
    /// The storage path of the root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns every token of the storage path, separators included.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the child selectors, skipping the `"value"` separators.
    pub fn selectors(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().skip(1).step_by(2)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Strips one `"value"` + segment pair, or returns `None` at the root.
    pub fn parent(&self) -> Option<StoragePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 2].to_vec(),
        })
    }

    /// Recovers the structured path.
    pub fn to_path(&self) -> Path {
        self.selectors().cloned().collect()
    }
}

/// Constructs a [`Path`] from segments.
///
/// String-like arguments become keys, integers become indices.
///
/// ```rust
/// # use pathstore::path;
/// let empty = path![];
/// assert!(empty.is_empty());
///
/// let index = 2usize;
/// let path = path!["friends", index, "name"];
/// assert_eq!(path.to_string(), "friends[2].name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::path::Path::new()
    };

    ($($segment:expr),+ $(,)?) => {
        $crate::path::Path::from_segments(vec![$($crate::path::Segment::from($segment)),+])
    };
}
