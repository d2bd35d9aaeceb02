/// Everything the poll loop remembers between cycles.
///
/// `last_report` is the single change-suppression slot: it holds either the
/// status key of the last delivered homework notification or the text of the
/// last delivered error diagnostic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    cursor: i64,
    last_report: Option<String>,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower bound (Unix seconds) for the next API query
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_report(&self) -> Option<&str> {
        self.last_report.as_deref()
    }

    /// Whether `report` differs from the last delivered one
    pub fn is_new(&self, report: &str) -> bool {
        self.last_report.as_deref() != Some(report)
    }

    pub fn commit_report(&mut self, report: impl Into<String>) {
        self.last_report = Some(report.into());
    }

    pub fn advance_cursor(&mut self, timestamp: i64) {
        self.cursor = timestamp;
    }
}
