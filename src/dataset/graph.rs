//! Bounded-depth traversal of dataset references
//!
//! The iterator does no I/O. The caller fetches the dataset for each id it
//! hands out and feeds it back through [`GraphIterator::next`].

use tracing::debug;

use super::{Dataset, DatasetMap};
use crate::error::Result;
use crate::id::DatasetId;
use crate::loader::DatasetLoader;

/// What the caller should do after feeding a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphStep {
    /// Fetch this dataset and pass it to `next`
    Next(DatasetId),
    Done,
}

#[derive(Debug, Clone)]
pub struct GraphIterator {
    visited: DatasetMap,
    levels: Vec<Vec<DatasetId>>,
    index: usize,
    depth: usize,
    max_depth: usize,
    done: bool,
}

impl GraphIterator {
    pub fn new(root: DatasetId, max_depth: usize) -> Self {
        Self {
            visited: DatasetMap::new(),
            levels: vec![vec![root]],
            index: 0,
            depth: 0,
            max_depth,
            done: false,
        }
    }

    /// The id the caller should fetch first
    pub fn root(&self) -> &DatasetId {
        &self.levels[0][0]
    }

    /// Record `current` and return the next id to fetch
    pub fn next(&mut self, current: Dataset) -> GraphStep {
        if self.done || self.max_depth == 0 {
            return GraphStep::Done;
        }

        if self.levels.len() <= self.depth + 1 {
            self.levels.push(Vec::new());
        }
        self.levels[self.depth + 1].extend(current.references());
        self.visited.insert(current.id().clone(), current);

        if self.index + 1 >= self.levels[self.depth].len() {
            self.index = 0;
            let exhausted = self.max_depth <= self.depth || self.levels[self.depth + 1].is_empty();
            self.depth += 1;
            if exhausted {
                self.done = true;
                return GraphStep::Done;
            }
        } else {
            self.index += 1;
        }
        GraphStep::Next(self.levels[self.depth][self.index].clone())
    }

    /// Every dataset fed so far
    pub fn result(&self) -> &DatasetMap {
        &self.visited
    }

    pub fn into_result(self) -> DatasetMap {
        self.visited
    }
}

/// Walk the graph from `root` using `loader` for each fetch
pub fn load_dataset_graph(
    root: DatasetId,
    max_depth: usize,
    loader: &dyn DatasetLoader,
) -> Result<DatasetMap> {
    let mut it = GraphIterator::new(root.clone(), max_depth);
    let mut next = root;
    loop {
        let Some(dataset) = loader.load_datasets(std::slice::from_ref(&next))?.into_iter().next()
        else {
            debug!(dataset = %next, "dataset not found, stopping graph walk");
            break;
        };
        match it.next(dataset) {
            GraphStep::Next(id) => next = id,
            GraphStep::Done => break,
        }
    }
    Ok(it.into_result())
}
