use crate::context::Context;
use crate::present;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Effect vocabulary understood by the action executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    GoToStep,
    SaveStepValues,
    InitStepValues,
    FinishWizard,
    UpdateComponent,
    SetValue,
    AddError,
    ClearErrors,
    ConsoleLog,
    RemoteUpdateComponent,
    AddGroup,
    RemoveGroup,
    TakePhoto,
    KillTask,
    SetLocalContext,
    ConfirmLeavePage,
    /// Any type string outside the vocabulary, kept verbatim.
    Unknown(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::GoToStep => "GO_TO_STEP",
            ActionType::SaveStepValues => "SAVE_STEP_VALUES",
            ActionType::InitStepValues => "INIT_STEP_VALUES",
            ActionType::FinishWizard => "FINISH_WIZARD",
            ActionType::UpdateComponent => "UPDATE_COMPONENT",
            ActionType::SetValue => "SET_VALUE",
            ActionType::AddError => "ADD_ERROR",
            ActionType::ClearErrors => "CLEAR_ERRORS",
            ActionType::ConsoleLog => "CONSOLE_LOG",
            ActionType::RemoteUpdateComponent => "REMOTE_UPDATE_COMPONENT",
            ActionType::AddGroup => "ADD_GROUP",
            ActionType::RemoveGroup => "REMOVE_GROUP",
            ActionType::TakePhoto => "TAKE_PHOTO",
            ActionType::KillTask => "KILL_TASK",
            ActionType::SetLocalContext => "SET_LOCAL_CONTEXT",
            ActionType::ConfirmLeavePage => "CONFIRM_LEAVE_PAGE",
            ActionType::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ActionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "GO_TO_STEP" => ActionType::GoToStep,
            "SAVE_STEP_VALUES" => ActionType::SaveStepValues,
            "INIT_STEP_VALUES" => ActionType::InitStepValues,
            "FINISH_WIZARD" => ActionType::FinishWizard,
            "UPDATE_COMPONENT" => ActionType::UpdateComponent,
            "SET_VALUE" => ActionType::SetValue,
            "ADD_ERROR" => ActionType::AddError,
            "CLEAR_ERRORS" => ActionType::ClearErrors,
            "CONSOLE_LOG" => ActionType::ConsoleLog,
            "REMOTE_UPDATE_COMPONENT" => ActionType::RemoteUpdateComponent,
            "ADD_GROUP" => ActionType::AddGroup,
            "REMOVE_GROUP" => ActionType::RemoveGroup,
            "TAKE_PHOTO" => ActionType::TakePhoto,
            "KILL_TASK" => ActionType::KillTask,
            "SET_LOCAL_CONTEXT" => ActionType::SetLocalContext,
            "CONFIRM_LEAVE_PAGE" => ActionType::ConfirmLeavePage,
            _ => ActionType::Unknown(raw),
        }
    }
}

impl From<ActionType> for String {
    fn from(kind: ActionType) -> Self {
        match kind {
            ActionType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation target: a literal step name or a context resolving to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepTarget {
    Name(String),
    Context(Box<Context>),
}

/// Declared effect. Fields are optional at the document level; each action type
/// checks the ones it requires when it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<StepTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_prop: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_contexts: Vec<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_contexts: Vec<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_index: Option<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_name: Option<String>,
}

impl Action {
    /// Action of the given type with no parameters set.
    pub fn of_type(action_type: ActionType, order: f64) -> Self {
        Action {
            action_type,
            order,
            step_name: None,
            target_name: None,
            target_prop: None,
            target_contexts: Vec::new(),
            field_name: None,
            field_contexts: Vec::new(),
            error_message: None,
            message: None,
            name: None,
            value: None,
            context: None,
            contexts: Vec::new(),
            group_name: None,
            group_index: None,
            context_name: None,
        }
    }
}
