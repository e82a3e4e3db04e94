//! Highlight movement.

/// Direction of a keyboard move through the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the first suggestion (ArrowUp).
    Up,
    /// Towards the last suggestion (ArrowDown).
    Down,
}

impl Direction {
    /// The index offset of one step: `-1` or `+1`.
    pub fn offset(self) -> i32 {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }
}

/// Compute the highlight index after moving one step from `current` in a
/// list of `len` suggestions.
///
/// Moving past the last item wraps to the first and moving before the first
/// wraps to the last. With no highlight, `Down` lands on the first item and
/// `Up` on the last. An empty list has nothing to highlight.
pub fn next_index(current: Option<usize>, direction: Direction, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = match (current, direction) {
        (None, Direction::Down) => 0,
        (None, Direction::Up) => len - 1,
        (Some(i), Direction::Down) if i + 1 >= len => 0,
        (Some(i), Direction::Down) => i + 1,
        (Some(0), Direction::Up) => len - 1,
        (Some(i), Direction::Up) => (i - 1).min(len - 1),
    };
    Some(index)
}

/// Whether `index` is a legal highlight for a list of `len` suggestions.
pub fn is_valid_highlight(index: Option<usize>, len: usize) -> bool {
    index.is_none_or(|i| i < len)
}
