//! Generated workflow document.
//!
//! Field order of these types is the order keys appear in the rendered
//! YAML, and [`Jobs`] keeps job insertion order.

use crate::triggers::Triggers;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

const HEADER: &str = "# DO NOT MODIFY MANUALLY!\n# This file has been autogenerated by invoking:\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub name: String,
    pub on: Triggers,
    pub permissions: String,
    pub jobs: Jobs,
}

impl Workflow {
    pub fn new(name: impl Into<String>, on: Triggers) -> Self {
        Self {
            name: name.into(),
            on,
            permissions: "read-all".to_string(),
            jobs: Jobs::default(),
        }
    }

    /// Render the document with a header naming the regenerating command.
    pub fn render(&self, command: &str) -> cbl_core::Result<String> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{}# $ {}\n{}", HEADER, command, body))
    }
}

/// Job id to definition mapping in insertion order.
///
/// Inserting an existing id replaces the definition in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Jobs(Vec<(String, Job)>);

impl Jobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, job: Job) {
        let id = id.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = job,
            None => self.0.push((id, job)),
        }
    }

    pub fn extend(&mut self, other: Jobs) {
        for (id, job) in other.0 {
            self.insert(id, job);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.0.iter().find(|(existing, _)| existing == id).map(|(_, job)| job)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Jobs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, job) in &self.0 {
            map.serialize_entry(id, job)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(rename = "timeout-minutes", skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub outputs: serde_yaml::Mapping,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub env: serde_yaml::Mapping,
    pub steps: Vec<Step>,
}

impl Job {
    /// Job on the hosted Ubuntu runner with no steps yet.
    pub fn ubuntu(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            needs: None,
            condition: None,
            runs_on: "ubuntu-latest".to_string(),
            container: None,
            timeout_minutes: None,
            permissions: None,
            outputs: serde_yaml::Mapping::new(),
            env: serde_yaml::Mapping::new(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Container {
    Image(String),
    WithOptions { image: String, options: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub with: serde_yaml::Mapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub env: serde_yaml::Mapping,
    #[serde(rename = "continue-on-error", skip_serializing_if = "std::ops::Not::not")]
    pub continue_on_error: bool,
}

impl Step {
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn run(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            run: Some(script.into()),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Let the job carry on when this step fails.
    pub fn allow_failure(mut self) -> Self {
        self.continue_on_error = true;
        self
    }
}
