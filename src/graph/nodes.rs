// Sherwood - Fort Graph
// nodes.rs - Fort vertices and their capability flags
//
// Capabilities are an explicit boolean triple attached to each fort when
// the graph is built. Nothing is ever inferred from the label text.
//
// Copyright (c) 2026 CIPS Corps. All rights reserved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hidden, read-only capabilities of a fort.
///
/// Each flag is independent:
/// - `self_alert`: the fort is always on high alert, even as the first target.
/// - `immune`: the fort's reward is never halved.
/// - `shield`: attacking this fort never puts its neighbours on alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub self_alert: bool,
    #[serde(default)]
    pub immune: bool,
    #[serde(default)]
    pub shield: bool,
}

impl Capabilities {
    /// No special capabilities.
    pub const NONE: Capabilities = Capabilities {
        self_alert: false,
        immune: false,
        shield: false,
    };

    pub fn new(self_alert: bool, immune: bool, shield: bool) -> Self {
        Self {
            self_alert,
            immune,
            shield,
        }
    }

    pub fn with_self_alert(mut self) -> Self {
        self.self_alert = true;
        self
    }

    pub fn with_immune(mut self) -> Self {
        self.immune = true;
        self
    }

    pub fn with_shield(mut self) -> Self {
        self.shield = true;
        self
    }

    /// Whether attacking this fort propagates alert to its neighbours.
    pub fn propagates_alert(&self) -> bool {
        !self.shield
    }

    /// Whether this fort's reward can be halved at all.
    pub fn can_be_halved(&self) -> bool {
        !self.immune
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<&str> = [
            (self.self_alert, "self-alert"),
            (self.immune, "immune"),
            (self.shield, "shield"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();

        if flags.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", flags.join("+"))
        }
    }
}

/// A single fort: one vertex of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort {
    /// Unique label within the graph.
    pub label: String,
    /// Base gold value (non-negative).
    pub value: f64,
    /// Capability triple, resolved once at construction.
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl Fort {
    pub fn new(label: impl Into<String>, value: f64, capabilities: Capabilities) -> Self {
        Self {
            label: label.into(),
            value,
            capabilities,
        }
    }

    /// A fort with no special capabilities.
    pub fn plain(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, value, Capabilities::NONE)
    }
}

impl fmt::Display for Fort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} gold, {})", self.label, self.value, self.capabilities)
    }
}
