//! Bounded conversation history for sequential generation.

/// Shown to the model in place of an empty history.
pub const CONVERSATION_START: &str = "(conversation start)";

/// Lines generated so far in one group, with a bounded view for prompts.
///
/// # Examples
///
/// ```
/// use scriptorium_pipeline::{CONVERSATION_START, HistoryWindow};
///
/// let mut history = HistoryWindow::new(2);
/// assert_eq!(history.render(), CONVERSATION_START);
///
/// history.push("iroha: Hi");
/// history.push("mio: Hello");
/// history.push("iroha: Bye");
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.render(), "mio: Hello\niroha: Bye");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    lines: Vec<String>,
    limit: usize,
}

impl HistoryWindow {
    /// Empty history showing at most `limit` recent lines.
    pub fn new(limit: usize) -> Self {
        Self {
            lines: Vec::new(),
            limit,
        }
    }

    /// Append one generated line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append lines in order.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// The most recent `limit` lines, oldest first.
    pub fn recent(&self) -> &[String] {
        let start = self.lines.len().saturating_sub(self.limit);
        &self.lines[start..]
    }

    /// Recent lines joined by newlines, or [`CONVERSATION_START`] when empty.
    pub fn render(&self) -> String {
        let recent = self.recent();
        if recent.is_empty() {
            CONVERSATION_START.to_string()
        } else {
            recent.join("\n")
        }
    }

    /// Total lines recorded, including those outside the window.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
