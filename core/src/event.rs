//! Events — every state change a session makes, in order.
//!
//! RULE: the UI and telemetry learn about sand only through these.
//! Variants are appended, never removed or reordered.

use crate::{
    progression::RewardDescriptor,
    types::{Grains, Hour, Side},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HourglassEvent {
    // ── Combat events ─────────────────────────────
    GrainsAccrued {
        side:     Side,
        produced: Grains,
        credited: Grains,
        current:  Grains,
    },
    SandSpent {
        side:      Side,
        cost:      Grains,
        remaining: Grains,
    },
    PaymentRefused {
        side:    Side,
        cost:    Grains,
        current: Grains,
    },
    AccrualPaused {
        side: Side,
    },
    AccrualResumed {
        side: Side,
    },

    // ── Campaign events ───────────────────────────
    HourAdvanced {
        hour:         Hour,
        name:         String,
        accrual_rate: f64,
        reward:       Option<RewardDescriptor>,
    },
    CampaignCompleted,

    // ── Divine judgment ───────────────────────────
    DivineFavorChanged {
        side:  Side,
        favor: i32,
    },
}

impl HourglassEvent {
    /// Stable name, used as a log/telemetry key.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GrainsAccrued { .. }  => "grains_accrued",
            Self::SandSpent { .. }      => "sand_spent",
            Self::PaymentRefused { .. } => "payment_refused",
            Self::AccrualPaused { .. }  => "accrual_paused",
            Self::AccrualResumed { .. } => "accrual_resumed",
            Self::HourAdvanced { .. }   => "hour_advanced",
            Self::CampaignCompleted     => "campaign_completed",
            Self::DivineFavorChanged { .. } => "divine_favor_changed",
        }
    }
}
