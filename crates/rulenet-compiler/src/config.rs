//! Compilation options.

/// Default limit on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for a single `compile` call.
#[derive(Clone, Debug)]
pub struct Config {
    /// Check literal restrictions and expression references against
    /// accumulated constraint records.
    static_constraint_checking: bool,
    /// Deepest expression nesting accepted before `NestingTooDeep`.
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            static_constraint_checking: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether static constraint checking is performed.
    pub fn static_constraint_checking(mut self, value: bool) -> Self {
        self.static_constraint_checking = value;
        self
    }

    /// Set the expression nesting limit.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }

    pub fn checks_static_constraints(&self) -> bool {
        self.static_constraint_checking
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }
}
