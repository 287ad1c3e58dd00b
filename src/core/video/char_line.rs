use std::fmt;

/// Text read from one frame's overlay band.
///
/// Both halves are fixed-width and space padded; their length is the
/// layout's `frame_string_length`. No terminator is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharLine {
    left: String,
    right: String,
}

impl CharLine {
    /// Wraps both halves as given. Widths are not checked; readers that
    /// need the fixed layout width go through [`CharLine::fixed`].
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Both halves must be ASCII and exactly `length` bytes long.
    pub fn fixed(left: impl Into<String>, right: impl Into<String>, length: usize) -> Option<Self> {
        let line = Self::new(left, right);
        let fits = |half: &str| half.len() == length && half.is_ascii();
        (fits(&line.left) && fits(&line.right)).then_some(line)
    }

    /// A line of `length` spaces on each side.
    pub fn blank(length: usize) -> Self {
        Self::new(" ".repeat(length), " ".repeat(length))
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// Character `from_end` positions before the end of the right half,
    /// `right_from_end(1)` being the last one.
    pub fn right_from_end(&self, from_end: usize) -> Option<u8> {
        let bytes = self.right.as_bytes();
        bytes
            .len()
            .checked_sub(from_end)
            .and_then(|i| bytes.get(i).copied())
    }

    pub fn is_left_blank(&self) -> bool {
        self.left.bytes().all(|b| b == b' ')
    }
}

impl fmt::Display for CharLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.left, self.right)
    }
}
