//! Document model for declarative wizards: steps, components, remote actions,
//! and the context/condition/action/block descriptors interpreted at runtime.

pub mod action;
pub mod block;
pub mod condition;
pub mod context;
pub mod document;

pub use action::{Action, ActionType, StepTarget};
pub use block::{Block, BlockKind, BlockType};
pub use condition::{
    Comparison, Condition, ConditionRule, Operand, PathCheck, Predicate, RegexCheck, RemoteCheck,
};
pub use context::{Context, ContextType};
pub use document::{
    Component, ComponentType, ContentType, EventType, Events, ExpressionKind, HttpMethod,
    Position, RemoteAction, Step, Wizard,
};

use serde::{Deserialize, Deserializer};

/// Deserialize a field so that an explicit `null` is kept as `Some(..)` and only
/// an absent field (via `#[serde(default)]`) yields `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
