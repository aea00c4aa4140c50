//! Signal: the discrete position a pair strategy wants to hold.

use serde::{Deserialize, Serialize};

/// Desired exposure to the spread.
///
/// `Long` buys the spread (long A, short B); `Short` sells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

impl Signal {
    /// Position multiplier applied to the leg-return difference.
    pub fn direction(self) -> f64 {
        match self {
            Signal::Long => 1.0,
            Signal::Short => -1.0,
            Signal::Flat => 0.0,
        }
    }

    pub fn is_flat(self) -> bool {
        self == Signal::Flat
    }

    /// Integer encoding used in exported artifacts (+1 / -1 / 0).
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }
}
