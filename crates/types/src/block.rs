use crate::action::Action;
use crate::condition::Condition;
use crate::context::Context;
use serde::{Deserialize, Serialize};

/// Explicit control-flow type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    #[serde(rename = "ACTIONS")]
    Actions,
    #[serde(rename = "CONDITIONAL")]
    Conditional,
    #[serde(rename = "FOREACH")]
    ForEach,
    #[serde(rename = "SCHEDULE_TASK")]
    ScheduleTask,
}

/// Control-flow tree node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    #[serde(default)]
    pub order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Vec<Block>>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Vec<Block>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    /// Loop name for FOREACH blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Array source for FOREACH blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
    /// Accepted for SCHEDULE_TASK documents; scheduling itself is not implemented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delays: Option<Vec<f64>>,
}

/// Shape a block is executed as, after applying the inference rules for
/// untyped blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Actions,
    Conditional,
    ForEach,
    ScheduleTask,
    /// No rule matched; any `actions` list is still executed.
    Plain,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        if self.block_type == Some(BlockType::Actions) && self.actions.is_some() {
            return BlockKind::Actions;
        }
        if self.block_type == Some(BlockType::Conditional) || self.conditions.is_some() {
            return BlockKind::Conditional;
        }
        match self.block_type {
            Some(BlockType::ForEach) => BlockKind::ForEach,
            Some(BlockType::ScheduleTask) => BlockKind::ScheduleTask,
            _ => BlockKind::Plain,
        }
    }
}
