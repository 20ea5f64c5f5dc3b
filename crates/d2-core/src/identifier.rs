//! Interned identifiers for D2 shape paths.
//!
//! A D2 shape is addressed by a dot-separated path (`network.cell.tower`).
//! [`Id`] stores such a path as a symbol in a process-wide string interner so
//! that paths are cheap to copy, hash and compare.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Separator placed between the segments of a nested path.
pub const PATH_SEPARATOR: char = '.';

/// Global string interner backing every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An interned shape path.
///
/// # Examples
///
/// ```
/// use d2_core::identifier::Id;
///
/// let network = Id::new("network");
/// let tower = network.create_nested(Id::new("tower"));
/// assert_eq!(tower, "network.tower");
///
/// let same = Id::from_segments(["network", "tower"]);
/// assert_eq!(tower, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an `Id` by joining path segments with [`PATH_SEPARATOR`].
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for segment in segments {
            if !joined.is_empty() {
                joined.push(PATH_SEPARATOR);
            }
            joined.push_str(segment.as_ref());
        }
        Self::new(&joined)
    }

    /// Creates a nested path `self.child`.
    pub fn create_nested(&self, child: Id) -> Self {
        let mut interner = interner();
        let nested = {
            let parent = interner
                .resolve(self.0)
                .expect("interned symbol resolves in its own interner");
            let child = interner
                .resolve(child.0)
                .expect("interned symbol resolves in its own interner");
            format!("{parent}{PATH_SEPARATOR}{child}")
        };
        Self(interner.get_or_intern(nested))
    }

    /// Returns the parent path, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<Self> {
        let text = self.to_string();
        text.rsplit_once(PATH_SEPARATOR)
            .map(|(parent, _)| Self::new(parent))
    }

    /// Number of dot-separated segments in this path.
    pub fn depth(&self) -> usize {
        self.to_string().split(PATH_SEPARATOR).count()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let text = interner
            .resolve(self.0)
            .expect("interned symbol resolves in its own interner");
        f.write_str(text)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
