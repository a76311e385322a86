use std::collections::BTreeSet;
use std::fmt;

use crate::error::ScrubError;

/// One token of a page specification: a single page or an inclusive span,
/// 1-based as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Parse a single token like "7" or "15-18".
    pub fn parse(token: &str) -> Result<Self, ScrubError> {
        let token = token.trim();
        let malformed = || ScrubError::MalformedToken {
            token: token.to_string(),
        };

        let (start, end) = match token.split_once('-') {
            Some((start, end)) => {
                let start = start.trim().parse::<u32>().map_err(|_| malformed())?;
                let end = end.trim().parse::<u32>().map_err(|_| malformed())?;
                (start, end)
            }
            None => {
                let page = token.parse::<u32>().map_err(|_| malformed())?;
                (page, page)
            }
        };

        if start == 0 || end == 0 {
            return Err(ScrubError::InvalidPageNumber {
                token: token.to_string(),
            });
        }
        if start > end {
            return Err(ScrubError::DescendingRange {
                token: token.to_string(),
                start,
                end,
            });
        }

        Ok(PageRange { start, end })
    }

    /// Zero-based indices covered by this range, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end).map(|page| (page - 1) as usize)
    }
}

/// Deduplicated set of zero-based page indices, enumerated in ascending
/// order. Indices past the end of a given document are allowed here and
/// ignored at transform time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet(BTreeSet<usize>);

impl PageSet {
    /// Parse a comma-separated page specification like "12,15-18,22".
    /// Overlapping tokens collapse; order of tokens does not matter.
    pub fn parse(spec: &str) -> Result<Self, ScrubError> {
        if spec.trim().is_empty() {
            return Err(ScrubError::EmptySpec);
        }

        let mut indices = BTreeSet::new();
        for token in spec.split(',') {
            let range = PageRange::parse(token)?;
            indices.extend(range.indices());
        }
        Ok(PageSet(indices))
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Ascending zero-based indices.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for PageSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        PageSet(iter.into_iter().collect())
    }
}

/// Renders the selection as 1-based page numbers, ascending: "2, 5, 6, 7".
impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index + 1)?;
        }
        Ok(())
    }
}
