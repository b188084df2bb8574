//! Arrange a flat issue list into Epic → Story → task rows.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{Issue, IssueTier};

/// One row of the hierarchy, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HierarchyRow<'a> {
    pub issue: &'a Issue,
    /// 0 for epics and orphans, 1 for stories under an epic (or tasks under
    /// an orphan story), 2 for tasks under a matched story
    pub depth: u8,
}

/// Build the display order for a Gantt chart.
///
/// - Each epic is followed by its stories (depth 1), each story by its
///   task-like children (depth 2).
/// - Stories without an epic parent in the set follow at depth 0, each with
///   its tasks at depth 1.
/// - Remaining task-like issues come last at depth 0.
///
/// Sibling order follows input order. Every key is emitted once; if the
/// input repeats a key only the first occurrence is used.
pub fn build_hierarchy(issues: &[Issue]) -> Vec<HierarchyRow<'_>> {
    let mut seen_keys = HashSet::new();
    let unique: Vec<&Issue> = issues
        .iter()
        .filter(|issue| seen_keys.insert(issue.key.as_str()))
        .collect();

    let mut epics = Vec::new();
    let mut stories = Vec::new();
    let mut tasks = Vec::new();
    let mut stories_by_parent: HashMap<&str, Vec<&Issue>> = HashMap::new();
    let mut tasks_by_parent: HashMap<&str, Vec<&Issue>> = HashMap::new();

    for issue in unique {
        match issue.tier() {
            IssueTier::Epic => epics.push(issue),
            IssueTier::Story => {
                stories.push(issue);
                if let Some(parent) = issue.parent_key.as_deref() {
                    stories_by_parent.entry(parent).or_default().push(issue);
                }
            }
            IssueTier::TaskLike => {
                tasks.push(issue);
                if let Some(parent) = issue.parent_key.as_deref() {
                    tasks_by_parent.entry(parent).or_default().push(issue);
                }
            }
        }
    }

    let mut rows = Vec::with_capacity(issues.len());
    let mut emitted: HashSet<&str> = HashSet::new();

    for &epic in &epics {
        emitted.insert(epic.key.as_str());
        rows.push(HierarchyRow { issue: epic, depth: 0 });

        for &story in stories_by_parent.get(epic.key.as_str()).into_iter().flatten() {
            if !emitted.insert(story.key.as_str()) {
                continue;
            }
            rows.push(HierarchyRow { issue: story, depth: 1 });

            for &task in tasks_by_parent.get(story.key.as_str()).into_iter().flatten() {
                if emitted.insert(task.key.as_str()) {
                    rows.push(HierarchyRow { issue: task, depth: 2 });
                }
            }
        }
    }

    // Orphan stories and their tasks
    for &story in &stories {
        if !emitted.insert(story.key.as_str()) {
            continue;
        }
        rows.push(HierarchyRow { issue: story, depth: 0 });

        for &task in tasks_by_parent.get(story.key.as_str()).into_iter().flatten() {
            if emitted.insert(task.key.as_str()) {
                rows.push(HierarchyRow { issue: task, depth: 1 });
            }
        }
    }

    // Orphan tasks
    for &task in &tasks {
        if emitted.insert(task.key.as_str()) {
            rows.push(HierarchyRow { issue: task, depth: 0 });
        }
    }

    rows
}
