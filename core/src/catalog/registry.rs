use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use super::options::OptionKind;
use super::types::{TaskCategory, TaskDefinition};
use super::BUILTIN_CATALOG;
use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<TaskCategory>,
}

/// Validated task registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<TaskCategory>,
    /// task_id -> (category index, task index)
    index: HashMap<String, (usize, usize)>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        Self::from_categories(file.categories)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let s = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&s)?;
        tracing::debug!(
            target: "maactl.catalog",
            stage = "catalog.load",
            path = %path.display(),
            tasks = catalog.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from categories, validating identifiers and option schemas.
    pub fn from_categories(categories: Vec<TaskCategory>) -> Result<Self, CatalogError> {
        let mut category_ids = HashSet::new();
        let mut index = HashMap::new();

        for (ci, category) in categories.iter().enumerate() {
            if !category_ids.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategoryId(category.id.clone()));
            }
            for (ti, task) in category.tasks.iter().enumerate() {
                if index.contains_key(&task.id) {
                    return Err(CatalogError::DuplicateTaskId(task.id.clone()));
                }
                validate_task(task)?;
                index.insert(task.id.clone(), (ci, ti));
            }
        }

        Ok(Self { categories, index })
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskDefinition> {
        let &(ci, ti) = self.index.get(task_id)?;
        self.categories.get(ci).and_then(|c| c.tasks.get(ti))
    }

    pub fn category_of(&self, task_id: &str) -> Option<&TaskCategory> {
        let &(ci, _) = self.index.get(task_id)?;
        self.categories.get(ci)
    }

    pub fn categories(&self) -> &[TaskCategory] {
        &self.categories
    }

    /// All tasks in declared order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.categories.iter().flat_map(|c| c.tasks.iter())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate_task(task: &TaskDefinition) -> Result<(), CatalogError> {
    if task.command.trim().is_empty() {
        return Err(CatalogError::EmptyCommand(task.id.clone()));
    }

    if task.has_advanced == task.options.is_empty() {
        return Err(CatalogError::AdvancedMismatch {
            task_id: task.id.clone(),
            has_advanced: task.has_advanced,
            options: task.options.len(),
        });
    }

    let mut keys = HashSet::new();
    for option in &task.options {
        if !keys.insert(option.key.as_str()) {
            return Err(CatalogError::DuplicateOptionKey {
                task_id: task.id.clone(),
                key: option.key.clone(),
            });
        }

        let flag_ok = option.flag.len() > 2
            && option.flag.starts_with("--")
            && !option.flag.contains(char::is_whitespace);
        if !flag_ok {
            return Err(CatalogError::InvalidFlag {
                task_id: task.id.clone(),
                key: option.key.clone(),
                flag: option.flag.clone(),
            });
        }

        if option.kind == OptionKind::Select {
            if option.choices.is_empty() {
                return Err(CatalogError::EmptyChoices {
                    task_id: task.id.clone(),
                    key: option.key.clone(),
                });
            }
            let Some(default) = option.default.as_deref() else {
                return Err(CatalogError::MissingSelectDefault {
                    task_id: task.id.clone(),
                    key: option.key.clone(),
                });
            };
            if !option.choices.iter().any(|c| c.value == default) {
                return Err(CatalogError::UnknownSelectDefault {
                    task_id: task.id.clone(),
                    key: option.key.clone(),
                    default: default.to_string(),
                });
            }
        }
    }

    Ok(())
}
