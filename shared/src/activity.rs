use serde::{Deserialize, Serialize};

/// Loading indicator: on when the user acts, off when something is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityIndicator {
    #[default]
    Inactive,
    Active,
}

impl ActivityIndicator {
    pub fn on_action(&mut self) {
        *self = Self::Active;
    }

    pub fn on_settled(&mut self) {
        *self = Self::Inactive;
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}
