/// Options affecting semantic analysis behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerOptions {
    /// Report bindings that were declared but never used when their scope
    /// closes. Off by default.
    pub warn_unused: bool,
}

impl AnalyzerOptions {
    pub fn strict() -> Self {
        AnalyzerOptions { warn_unused: true }
    }
}
