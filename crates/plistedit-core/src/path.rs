use std::fmt;

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Dictionary key.
    Key(String),
    /// Array index.
    Index(usize),
}

/// Location of a node below the root dictionary.
///
/// Displayed as dot-separated segments with indices in brackets
/// (`Settings.Items.[0]`); the empty path displays as `root`. Inside a key a
/// backslash escapes `.` and `\\`, and a key spelled `root` or `[n]` gets a
/// leading backslash, so every displayed path parses back to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<Segment>,
}

impl NodePath {
    /// The root dictionary.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Path extended by a dictionary key.
    pub fn push_key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    /// Path extended by an array index.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Segments from the root outwards.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parses the display form back into a path.
    ///
    /// `""` and `"root"` are the root; unescaped `[n]` segments are indices
    /// and every other segment is a key. Returns `None` for empty segments
    /// and for a trailing lone backslash.
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() || input == "root" {
            return Some(Self::root());
        }
        let mut segments = Vec::new();
        let mut part = String::new();
        let mut escaped = false;
        let mut chars = input.chars();
        loop {
            match chars.next() {
                Some('\\') => {
                    part.push(chars.next()?);
                    escaped = true;
                }
                Some('.') => {
                    if part.is_empty() {
                        return None;
                    }
                    segments.push(segment(std::mem::take(&mut part), escaped));
                    escaped = false;
                }
                Some(c) => part.push(c),
                None => {
                    if part.is_empty() {
                        return None;
                    }
                    segments.push(segment(part, escaped));
                    break;
                }
            }
        }
        Some(Self { segments })
    }
}

fn segment(part: String, escaped: bool) -> Segment {
    if escaped {
        return Segment::Key(part);
    }
    match index_of(&part) {
        Some(idx) => Segment::Index(idx),
        None => Segment::Key(part),
    }
}

fn index_of(part: &str) -> Option<usize> {
    part.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|digits| digits.parse::<usize>().ok())
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if key == "root" || index_of(key).is_some() {
        f.write_str("\\")?;
    }
    for c in key.chars() {
        if c == '.' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "root");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Key(key) => write_key(f, key)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
