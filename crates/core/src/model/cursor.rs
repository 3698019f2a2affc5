/// What the primary button does on the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    Next,
    Submit,
}

/// Zero-based position in a question list, always clamped to `[0, len - 1]`.
///
/// Moves never wrap around. An empty list pins the index at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionCursor {
    index: usize,
    len: usize,
}

impl QuestionCursor {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Advance by one. Returns false when already on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Step back by one. Returns false when already on the first question.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn jump_to(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    #[must_use]
    pub fn primary_action(&self) -> CursorAction {
        if self.is_last() {
            CursorAction::Submit
        } else {
            CursorAction::Next
        }
    }
}
