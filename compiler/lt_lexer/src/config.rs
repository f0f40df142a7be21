/// Knobs for [`scan`](crate::scan).
///
/// `line_base` and `col_base` shift every reported position, which lets
/// embedded snippets report positions relative to their host file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Spaces per indentation level.
    pub indent_step: u32,
    pub line_base: i32,
    pub col_base: i32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            indent_step: 4,
            line_base: 0,
            col_base: 0,
        }
    }
}

impl ScanConfig {
    #[must_use]
    pub fn with_indent_step(mut self, indent_step: u32) -> Self {
        self.indent_step = indent_step.max(1);
        self
    }

    #[must_use]
    pub fn with_bases(mut self, line_base: i32, col_base: i32) -> Self {
        self.line_base = line_base;
        self.col_base = col_base;
        self
    }
}
