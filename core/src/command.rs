use serde::{Deserialize, Serialize};

use crate::{
    combatant::{Accrual, Alignment, RegenContext},
    progression::HourAdvance,
    types::{Grains, Side},
};

/// Everything the combat controller can ask of a session.
/// Variants added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SessionCommand {
    Tick { delta_seconds: f64 },
    Pay { side: Side, cost: Grains },
    PlayCard { side: Side, cost: Grains },
    BeginBlocking,
    EndBlocking,
    AdvanceHour,
    Judge { side: Side, alignment: Alignment },
    /// `context: null` turns dynamic regeneration off.
    SetRegen { side: Side, context: Option<RegenContext> },
}

/// What applying a command did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Ticked { player: Accrual, enemy: Accrual },
    Paid { side: Side, paid: bool },
    Blocking { depth: u32 },
    HourAdvanced { advance: HourAdvance },
    Favor { side: Side, favor: i32 },
    RegenSet { side: Side },
}
