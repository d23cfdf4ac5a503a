// src/tweaks/batch.rs

use super::step::Step;

/// One entry in a batch's ordered item list.
#[derive(Clone, Debug)]
pub enum BatchItem {
    Step(Step),
    /// A contiguous run of mutually independent sibling steps, safe to fan
    /// out across workers. The group is a barrier: everything after it waits
    /// for every step in it. Independence (no two steps touching the same
    /// adapter target) is the catalog author's guarantee.
    Group(Vec<Step>),
    Nested(Batch),
}

/// A named, ordered collection of steps and sub-batches representing one
/// user-facing operation. Batches are built once from static data, never
/// mutated, and can be executed any number of times.
#[derive(Clone, Debug)]
pub struct Batch {
    title: String,
    items: Vec<BatchItem>,
}

impl Batch {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn step(mut self, step: Step) -> Self {
        self.items.push(BatchItem::Step(step));
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.items.extend(steps.into_iter().map(BatchItem::Step));
        self
    }

    pub fn parallel(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        let group: Vec<Step> = steps.into_iter().collect();
        if !group.is_empty() {
            self.items.push(BatchItem::Group(group));
        }
        self
    }

    pub fn nested(mut self, batch: Batch) -> Self {
        self.items.push(BatchItem::Nested(batch));
        self
    }

    /// Total number of steps, counting through groups and nested batches.
    pub fn step_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                BatchItem::Step(_) => 1,
                BatchItem::Group(steps) => steps.len(),
                BatchItem::Nested(batch) => batch.step_count(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
