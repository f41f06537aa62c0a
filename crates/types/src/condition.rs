use crate::context::Context;
use crate::present;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boolean descriptor: either a literal or an object carrying one predicate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Literal(bool),
    Rule(Box<ConditionRule>),
}

/// Object form of a condition. Only the first recognized key (in declaration
/// order) is evaluated; see [`ConditionRule::predicate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_empty: Option<PathCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches_regex: Option<RegexCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_than: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

/// Target of `isEmpty`: a context, or a query path over the current step values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    /// Regular expression pattern.
    pub value: String,
}

/// Operands for `equals`, `lessThan` and `moreThan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Operand>,
}

/// Right-hand side of a comparison: any object with a `type` tag is treated as
/// a context, everything else is a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Context(Box<Context>),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCheck {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Context>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<Context>>,
}

impl RemoteCheck {
    /// Contexts to resolve for the call; `context` wins over `contexts` when both are set.
    pub fn bindings(&self) -> &[Context] {
        self.context
            .as_deref()
            .or(self.contexts.as_deref())
            .unwrap_or(&[])
    }
}

/// The single predicate selected from a [`ConditionRule`].
#[derive(Debug, Clone, Copy)]
pub enum Predicate<'a> {
    IsEmpty(&'a PathCheck),
    MatchesRegex(&'a RegexCheck),
    Equals(&'a Comparison),
    LessThan(&'a Comparison),
    MoreThan(&'a Comparison),
    All(&'a [Condition]),
    Any(&'a [Condition]),
    Not(&'a Condition),
    Remote(&'a RemoteCheck),
    Truthy(&'a Context),
}

impl ConditionRule {
    /// Pick the predicate to evaluate. Keys are checked in a fixed precedence order;
    /// `None` means no recognized key is present.
    pub fn predicate(&self) -> Option<Predicate<'_>> {
        if let Some(check) = &self.is_empty {
            return Some(Predicate::IsEmpty(check));
        }
        if let Some(check) = &self.matches_regex {
            return Some(Predicate::MatchesRegex(check));
        }
        if let Some(cmp) = &self.equals {
            return Some(Predicate::Equals(cmp));
        }
        if let Some(cmp) = &self.less_than {
            return Some(Predicate::LessThan(cmp));
        }
        if let Some(cmp) = &self.more_than {
            return Some(Predicate::MoreThan(cmp));
        }
        if let Some(items) = &self.and {
            return Some(Predicate::All(items));
        }
        if let Some(items) = &self.or {
            return Some(Predicate::Any(items));
        }
        if let Some(inner) = &self.not {
            return Some(Predicate::Not(inner));
        }
        if let Some(remote) = &self.remote {
            return Some(Predicate::Remote(remote));
        }
        self.context.as_ref().map(Predicate::Truthy)
    }
}
