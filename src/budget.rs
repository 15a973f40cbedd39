//! Per-request call budget
//!
//! One counter per capability. A capability whose quota is spent answers
//! with a fixed policy message instead of calling its provider again.

use crate::models::CapabilityKind;
use std::collections::HashMap;

pub const DEFAULT_CALL_QUOTA: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBudget {
    remaining: HashMap<CapabilityKind, u32>,
}

impl CallBudget {
    /// Same quota for every capability.
    pub fn new(quota: u32) -> Self {
        Self {
            remaining: CapabilityKind::ALL.into_iter().map(|kind| (kind, quota)).collect(),
        }
    }

    pub fn with_quota(mut self, kind: CapabilityKind, quota: u32) -> Self {
        self.remaining.insert(kind, quota);
        self
    }

    /// Takes one unit of quota. Returns false, leaving the budget untouched,
    /// when none is left.
    pub fn try_consume(&mut self, kind: CapabilityKind) -> bool {
        match self.remaining.get_mut(&kind) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, kind: CapabilityKind) -> u32 {
        self.remaining.get(&kind).copied().unwrap_or(0)
    }
}

impl Default for CallBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_QUOTA)
    }
}
