//! Plans and tasks as emitted by the completion service

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::catalog::ActionKind;
use crate::parser::parse_json;

/// A parsed response: a message for the operator plus tasks to run in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// One named action with its parameters.
///
/// Deserializing a task never fails. A task whose action or parameters are
/// malformed is kept with a defect so it fails on its own at dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub action: TaskAction,
    pub parameters: Map<String, Value>,
    #[serde(skip)]
    defect: Option<String>,
}

/// The action a task names. Names outside the vocabulary are kept so that a
/// single bad task fails on its own instead of rejecting the whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Known(ActionKind),
    Unknown(String),
}

impl TaskAction {
    pub fn as_str(&self) -> &str {
        match self {
            TaskAction::Known(kind) => kind.as_str(),
            TaskAction::Unknown(name) => name,
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            TaskAction::Known(kind) => Some(*kind),
            TaskAction::Unknown(_) => None,
        }
    }
}

impl From<&str> for TaskAction {
    fn from(name: &str) -> Self {
        let trimmed = name.trim();
        ActionKind::parse(trimmed)
            .map(TaskAction::Known)
            .unwrap_or_else(|| TaskAction::Unknown(trimmed.to_string()))
    }
}

impl From<ActionKind> for TaskAction {
    fn from(kind: ActionKind) -> Self {
        TaskAction::Known(kind)
    }
}

impl Serialize for TaskAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TaskAction::from(name.as_str()))
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Task::from_value(Value::deserialize(deserializer)?))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Task {
    pub fn new(action: impl Into<TaskAction>, parameters: Value) -> Self {
        let mut task = Self {
            action: action.into(),
            parameters: Map::new(),
            defect: None,
        };
        task.set_parameters(parameters);
        task
    }

    /// Read one entry of a plan's task list, keeping whatever is usable
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Self {
                    action: TaskAction::Unknown(String::new()),
                    parameters: Map::new(),
                    defect: Some(format!("task must be an object, got {}", json_type(&other))),
                };
            }
        };

        let (action, defect) = match fields.remove("action") {
            Some(Value::String(name)) => (TaskAction::from(name.as_str()), None),
            None | Some(Value::Null) => (
                TaskAction::Unknown(String::new()),
                Some("task has no action".to_string()),
            ),
            Some(other) => (
                TaskAction::Unknown(other.to_string()),
                Some(format!("action must be a string, got {}", json_type(&other))),
            ),
        };

        let mut task = Self {
            action,
            parameters: Map::new(),
            defect,
        };
        task.set_parameters(fields.remove("parameters").unwrap_or(Value::Null));
        task
    }

    /// Why this task cannot run regardless of its action's schema
    pub fn defect(&self) -> Option<&str> {
        self.defect.as_deref()
    }

    fn set_parameters(&mut self, parameters: Value) {
        match parameters {
            Value::Object(map) => self.parameters = map,
            Value::Null => {}
            other => {
                self.defect.get_or_insert_with(|| {
                    format!("parameters must be an object, got {}", json_type(&other))
                });
            }
        }
    }
}

impl Plan {
    pub fn new(response_message: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            response_message: response_message.into(),
            tasks,
        }
    }

    /// Repair-parse raw completion text into a plan.
    ///
    /// A bare array is read as the task list.
    pub fn parse(raw: &str) -> Option<Plan> {
        let value = parse_json(raw)?;
        let result = match value {
            Value::Array(_) => {
                serde_json::from_value::<Vec<Task>>(value).map(|tasks| Plan::new("", tasks))
            }
            other => serde_json::from_value::<Plan>(other),
        };
        match result {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::warn!("Response JSON is not a plan: {}", e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Plan {
        Plan::new(
            "Rotating, then watermarking.",
            vec![
                Task::new(ActionKind::Rotate, json!({"pages": "all", "angle": 90})),
                Task::new(
                    ActionKind::Watermark,
                    json!({"text": "DRAFT", "font_size": 50, "opacity": 0.3, "rotation": 45}),
                ),
                Task::new(ActionKind::Merge, json!({})),
            ],
        )
    }

    #[test]
    fn test_round_trip_plain_and_fenced() {
        let plan = sample();
        let text = serde_json::to_string_pretty(&plan).unwrap();
        assert_eq!(Plan::parse(&text), Some(plan.clone()));

        let fenced = format!("Sure, here is the plan.\n```json\n{}\n```\nLet me know!", text);
        assert_eq!(Plan::parse(&fenced), Some(plan));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["tasks"][0]["action"], "rotate");
        assert_eq!(json["tasks"][0]["parameters"]["angle"], 90);
        assert_eq!(json["tasks"][2]["parameters"], json!({}));
    }

    #[test]
    fn test_unknown_action_is_preserved() {
        let plan = Plan::parse(
            r#"{"response_message":"ok","tasks":[{"action":"remove_watermark"},{"action":"compress"}]}"#,
        )
        .unwrap();
        assert_eq!(plan.tasks[0].action, TaskAction::Unknown("remove_watermark".into()));
        assert_eq!(plan.tasks[1].action.kind(), Some(ActionKind::Compress));
        assert!(plan.tasks[1].parameters.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let plan = Plan::parse(r#"{"tasks":[{"action":"split","parameters":null}]}"#).unwrap();
        assert_eq!(plan.response_message, "");
        assert!(plan.tasks[0].parameters.is_empty());
        assert_eq!(Plan::parse(r#"{"response_message":"hi"}"#).unwrap().tasks, vec![]);
    }

    #[test]
    fn test_malformed_task_does_not_reject_plan() {
        let plan = Plan::parse(
            r#"{"response_message": "ok", "tasks": [
                {"action": "rotate", "parameters": {"angle": 90}},
                {"action": "watermark", "parameters": "DRAFT"},
                {"parameters": {"text": "X"}},
                {"action": 7},
                "compress"
            ]}"#,
        )
        .unwrap();
        assert_eq!(plan.tasks.len(), 5);
        assert_eq!(plan.tasks[0].defect(), None);
        assert_eq!(plan.tasks[0].parameters["angle"], 90);

        assert_eq!(plan.tasks[1].action.kind(), Some(ActionKind::Watermark));
        assert_eq!(
            plan.tasks[1].defect(),
            Some("parameters must be an object, got a string")
        );
        assert_eq!(plan.tasks[2].action, TaskAction::Unknown(String::new()));
        assert_eq!(plan.tasks[2].defect(), Some("task has no action"));
        assert_eq!(plan.tasks[3].action.as_str(), "7");
        assert_eq!(plan.tasks[3].defect(), Some("action must be a string, got a number"));
        assert_eq!(plan.tasks[4].defect(), Some("task must be an object, got a string"));
    }

    #[test]
    fn test_array_parameters_are_a_defect() {
        let task = Task::new(ActionKind::Rotate, json!([90]));
        assert!(task.parameters.is_empty());
        assert_eq!(task.defect(), Some("parameters must be an object, got an array"));
    }

    #[test]
    fn test_bare_task_array() {
        let plan = Plan::parse(r#"[{"action":"extract_text"}]"#).unwrap();
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].action.kind(), Some(ActionKind::ExtractText));
    }

    #[test]
    fn test_non_plan_json_is_none() {
        assert_eq!(Plan::parse(r#"{"tasks": "merge everything"}"#), None);
        assert_eq!(Plan::parse("I can't do that."), None);
    }
}
