use crate::error::BuildError;

/// Matching bracket positions, precomputed for O(1) jumps.
///
/// `partners[i]` holds the matching index for a `[` or `]` at index `i`.
/// For non-bracket positions it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    partners: Vec<Option<usize>>,
    pairs: usize,
}

impl JumpTable {
    /// Scan `code` once and pair every `[` with its `]`.
    ///
    /// Fails on the first `]` with nothing open, or, after the scan, on the
    /// most recently opened `[` still pending.
    pub fn build(code: &[char]) -> Result<Self, BuildError> {
        let mut partners: Vec<Option<usize>> = vec![None; code.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut pairs = 0;

        for (i, &c) in code.iter().enumerate() {
            if c == '[' {
                stack.push(i);
            } else if c == ']' {
                let Some(open_index) = stack.pop() else {
                    return Err(BuildError::UnmatchedClose { position: i });
                };
                partners[open_index] = Some(i);
                partners[i] = Some(open_index);
                pairs += 1;
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(BuildError::UnmatchedOpen {
                position: unmatched_open,
            });
        }

        tracing::debug!(positions = code.len(), pairs, "jump table built");
        Ok(Self { partners, pairs })
    }

    /// Position of the bracket paired with the one at `position`.
    pub fn partner(&self, position: usize) -> Option<usize> {
        self.partners.get(position).copied().flatten()
    }

    /// Number of bracket positions recorded (twice the number of loops).
    pub fn len(&self) -> usize {
        self.pairs * 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// `(open, close)` pairs ordered by the opening position.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partners
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.filter(|&j| j > i).map(|j| (i, j)))
    }
}
