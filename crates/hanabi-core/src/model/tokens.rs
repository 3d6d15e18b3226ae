use serde::{Deserialize, Serialize};

pub const MAX_INFO_TOKENS: u8 = 8;
pub const START_FUSE_TOKENS: u8 = 3;

/// Information and fuse counters shared by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    info: u8,
    fuses: u8,
}

impl Tokens {
    pub const fn new() -> Self {
        Self {
            info: MAX_INFO_TOKENS,
            fuses: START_FUSE_TOKENS,
        }
    }

    pub const fn info(&self) -> u8 {
        self.info
    }

    pub const fn fuses(&self) -> u8 {
        self.fuses
    }

    /// Saturates at the cap.
    pub fn regain_info(&mut self) {
        self.info = (self.info + 1).min(MAX_INFO_TOKENS);
    }

    /// Returns the fuses left afterwards.
    pub fn burn_fuse(&mut self) -> u8 {
        self.fuses = self.fuses.saturating_sub(1);
        self.fuses
    }

    pub const fn fuses_exhausted(&self) -> bool {
        self.fuses == 0
    }
}

impl Default for Tokens {
    fn default() -> Self {
        Self::new()
    }
}
