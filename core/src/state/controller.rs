use std::collections::{HashMap, HashSet};

use crate::catalog::{AdvancedValues, Catalog, OptionValue, TaskDefinition};
use crate::compose::{compose, ComposeRequest};
use crate::error::StateError;
use crate::reference::ReferenceResolution;

/// Everything the user has entered: per-task raw input, dry-run toggles, advanced values and the
/// reference resolution bound to each task.
///
/// All mutation goes through the named transitions below, so a resolution can never outlive the
/// text it was derived from.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    inputs: HashMap<String, String>,
    dry_run: HashSet<String>,
    advanced: AdvancedValues,
    resolutions: HashMap<String, ReferenceResolution>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self, task_id: &str) -> &str {
        self.inputs.get(task_id).map(String::as_str).unwrap_or("")
    }

    /// Replace the raw input of a task. Returns `true` when a bound resolution was dropped.
    pub fn set_input(&mut self, task_id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.input(task_id) == text {
            return false;
        }
        self.inputs.insert(task_id.to_string(), text);
        let invalidated = self.resolutions.remove(task_id).is_some();
        if invalidated {
            tracing::debug!(
                target: "maactl.state",
                stage = "state.resolution.invalidated",
                task_id = %task_id
            );
        }
        invalidated
    }

    pub fn is_dry_run(&self, task_id: &str) -> bool {
        self.dry_run.contains(task_id)
    }

    pub fn set_dry_run(&mut self, task_id: &str, enabled: bool) {
        if enabled {
            self.dry_run.insert(task_id.to_string());
        } else {
            self.dry_run.remove(task_id);
        }
    }

    pub fn advanced(&self) -> &AdvancedValues {
        &self.advanced
    }

    pub fn set_advanced(
        &mut self,
        catalog: &Catalog,
        task_id: &str,
        key: &str,
        value: OptionValue,
    ) -> Result<(), StateError> {
        let task = catalog
            .task(task_id)
            .ok_or_else(|| StateError::UnknownTask(task_id.to_string()))?;
        let option = task.option(key).ok_or_else(|| StateError::UnknownOption {
            task_id: task_id.to_string(),
            key: key.to_string(),
        })?;
        option.check_value(&value)?;
        self.advanced.set(task_id, key, value);
        Ok(())
    }

    /// Parse `raw` according to the option's kind, then store it.
    pub fn set_advanced_text(
        &mut self,
        catalog: &Catalog,
        task_id: &str,
        key: &str,
        raw: &str,
    ) -> Result<(), StateError> {
        let task = catalog
            .task(task_id)
            .ok_or_else(|| StateError::UnknownTask(task_id.to_string()))?;
        let option = task.option(key).ok_or_else(|| StateError::UnknownOption {
            task_id: task_id.to_string(),
            key: key.to_string(),
        })?;
        let value = option.parse_value(raw)?;
        self.advanced.set(task_id, key, value);
        Ok(())
    }

    pub fn clear_advanced(&mut self, task_id: &str, key: &str) -> Option<OptionValue> {
        self.advanced.remove(task_id, key)
    }

    pub fn resolution(&self, task_id: &str) -> Option<&ReferenceResolution> {
        self.resolutions.get(task_id)
    }

    /// Attach a resolution to a task. It must have been derived from the task's current input.
    pub fn bind_resolution(
        &mut self,
        catalog: &Catalog,
        task_id: &str,
        resolution: ReferenceResolution,
    ) -> Result<(), StateError> {
        let task = catalog
            .task(task_id)
            .ok_or_else(|| StateError::UnknownTask(task_id.to_string()))?;
        if !task.input.is_resolvable() {
            return Err(StateError::NotResolvable(task_id.to_string()));
        }
        if !resolution.is_bound_to(self.input(task_id)) {
            return Err(StateError::StaleResolution {
                task_id: task_id.to_string(),
            });
        }
        self.resolutions.insert(task_id.to_string(), resolution);
        Ok(())
    }

    pub fn clear_resolution(&mut self, task_id: &str) -> Option<ReferenceResolution> {
        self.resolutions.remove(task_id)
    }

    pub fn compose_request<'a>(&'a self, task: &'a TaskDefinition) -> ComposeRequest<'a> {
        ComposeRequest {
            task,
            raw_input: self.input(&task.id),
            values: self.advanced.for_task(&task.id),
            dry_run: self.is_dry_run(&task.id),
            resolution: self.resolution(&task.id),
        }
    }

    /// Argument string for `task_id` from the current state.
    pub fn compose(&self, catalog: &Catalog, task_id: &str) -> Result<String, StateError> {
        let task = catalog
            .task(task_id)
            .ok_or_else(|| StateError::UnknownTask(task_id.to_string()))?;
        Ok(compose(&self.compose_request(task)))
    }
}
