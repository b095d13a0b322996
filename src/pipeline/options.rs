//! Processing options and configuration.

/// Options for a single reconstruction pass.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Stop once the element at this position of the ordered stream has been
    /// processed (debug aid)
    pub break_after: Option<usize>,

    /// Record elements suppressed by span containment in the report
    pub trace_skipped: bool,
}

impl ProcessOptions {
    /// Create new process options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort on the first element that fails to convert.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Raise;
        self
    }

    /// Stop after the first element past position `n` that converts and
    /// claims its spans. Pages, sections and failed elements do not count.
    pub fn break_after(mut self, n: usize) -> Self {
        self.break_after = Some(n);
        self
    }

    /// Enable or disable the skipped-span trace.
    pub fn with_trace_skipped(mut self, trace: bool) -> Self {
        self.trace_skipped = trace;
        self
    }
}

/// Error handling mode during assembly.
///
/// Configuration and consistency errors abort the pass in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Drop the failing element, count it, and continue
    #[default]
    Ignore,
    /// Fail on the first element error
    Raise,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_options_builder() {
        let options = ProcessOptions::new()
            .strict()
            .break_after(12)
            .with_trace_skipped(true);

        assert_eq!(options.error_mode, ErrorMode::Raise);
        assert_eq!(options.break_after, Some(12));
        assert!(options.trace_skipped);
    }

    #[test]
    fn test_default_options() {
        let options = ProcessOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Ignore);
        assert_eq!(options.break_after, None);
        assert!(!options.trace_skipped);
    }
}
