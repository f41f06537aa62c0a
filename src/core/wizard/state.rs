use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Active FOREACH iteration, addressable by loop name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachFrame {
    pub name: String,
    pub index: usize,
    pub item: Value,
    pub array: Vec<Value>,
}

impl ForEachFrame {
    /// `{index, item, array}` view handed to loop expressions.
    pub fn scope_value(&self) -> Value {
        json!({
            "index": self.index,
            "item": self.item,
            "array": self.array,
        })
    }
}

/// Per-session mutable state threaded through every resolution call.
///
/// The caller owns one instance per wizard run and must not share it between
/// concurrently running triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationState {
    #[serde(default)]
    pub current_step_values: Map<String, Value>,
    #[serde(default)]
    pub all_step_values: Map<String, Value>,
    #[serde(default)]
    pub component_states: Map<String, Value>,
    #[serde(default)]
    pub local_contexts: Map<String, Value>,
    #[serde(default, rename = "forEachStacks")]
    pub for_each_stack: Vec<ForEachFrame>,
    #[serde(default)]
    pub group_index_stack: Vec<i64>,
}

impl EvaluationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_step_values(mut self, values: Map<String, Value>) -> Self {
        self.current_step_values = values;
        self
    }

    /// Innermost active loop frame with the given name.
    pub fn for_each_frame(&self, name: &str) -> Option<&ForEachFrame> {
        self.for_each_stack.iter().rev().find(|frame| frame.name == name)
    }

    pub fn current_group_index(&self) -> Option<i64> {
        self.group_index_stack.last().copied()
    }

    pub fn push_group_index(&mut self, index: i64) {
        self.group_index_stack.push(index);
    }

    pub fn pop_group_index(&mut self) -> Option<i64> {
        self.group_index_stack.pop()
    }

    pub(crate) fn push_frame(&mut self, frame: ForEachFrame) {
        self.for_each_stack.push(frame);
    }

    pub(crate) fn pop_frame(&mut self) -> Option<ForEachFrame> {
        self.for_each_stack.pop()
    }

    /// Copy of this state whose local contexts are overlaid with `bindings`.
    /// Mutations of the copy never reach the original.
    pub(crate) fn scoped(&self, bindings: &Map<String, Value>) -> EvaluationState {
        let mut scoped = self.clone();
        for (key, value) in bindings {
            scoped.local_contexts.insert(key.clone(), value.clone());
        }
        scoped
    }

    /// Union of current-step and all-step values used as template data.
    pub(crate) fn template_data(&self) -> Map<String, Value> {
        let mut data = self.current_step_values.clone();
        for (key, value) in &self.all_step_values {
            data.insert(key.clone(), value.clone());
        }
        data
    }
}
