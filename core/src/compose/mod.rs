//! Command composition: turns a task, its raw input, advanced values, the dry-run toggle and an
//! optional reference resolution into the argument string sent to the backend.
//!
//! Composition is pure and synchronous. The steps run in a fixed order and each one may rewrite
//! the accumulated string:
//!
//! 1. collapse multi-line job references into one space-separated line
//! 2. inject the collection suffix when a bound resolution asks for it
//! 3. dry-run: append `--dry-run` and stop
//! 4. append the default formation flag for job-reference tasks
//! 5. append advanced options in declared order

use crate::catalog::{TaskDefinition, TaskValues};
use crate::reference::{inject_collection_suffix, ReferenceResolution};

pub const DRY_RUN_FLAG: &str = "--dry-run";

/// Always appended for job-reference tasks outside dry-run mode.
pub const DEFAULT_FORMATION_FLAG: &str = "--formation";

#[derive(Debug, Clone, Copy)]
pub struct ComposeRequest<'a> {
    pub task: &'a TaskDefinition,
    pub raw_input: &'a str,
    pub values: Option<&'a TaskValues>,
    pub dry_run: bool,
    pub resolution: Option<&'a ReferenceResolution>,
}

impl<'a> ComposeRequest<'a> {
    pub fn new(task: &'a TaskDefinition, raw_input: &'a str) -> Self {
        Self {
            task,
            raw_input,
            values: None,
            dry_run: false,
            resolution: None,
        }
    }
}

pub fn compose(req: &ComposeRequest<'_>) -> String {
    let task = req.task;

    let mut out = if task.input.accepts_job_references() {
        collapse_lines(req.raw_input)
    } else {
        req.raw_input.trim().to_string()
    };

    if task.input.is_resolvable() {
        if let Some(resolution) = req.resolution {
            if resolution.auto_add_suffix() && resolution.is_bound_to(req.raw_input) {
                out = inject_collection_suffix(&out);
            }
        }
    }

    if req.dry_run && task.supports_dry_run {
        push_fragment(&mut out, DRY_RUN_FLAG);
        return out;
    }

    if task.input.accepts_job_references() {
        push_fragment(&mut out, DEFAULT_FORMATION_FLAG);
    }

    if let Some(values) = req.values {
        for option in &task.options {
            let Some(value) = values.get(&option.key) else {
                continue;
            };
            if let Some(fragment) = option.render_arg(value) {
                push_fragment(&mut out, &fragment);
            }
        }
    }

    out
}

/// Join non-blank lines with single spaces.
fn collapse_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_fragment(out: &mut String, fragment: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(fragment);
}
