//! Per-record behavior switches.

/// Where the primary key goes in an update's WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPlacement {
    /// `WHERE id = 42`, the key rendered as an integer literal.
    #[default]
    InlineLiteral,
    /// `WHERE id = ?`, the key bound like every other parameter.
    Bound,
}

/// Record configuration. `Default` keeps the inline update key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordConfig {
    pub update_key: KeyPlacement,
}

impl RecordConfig {
    pub fn with_update_key(mut self, placement: KeyPlacement) -> Self {
        self.update_key = placement;
        self
    }
}
