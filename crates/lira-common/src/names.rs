use bimap::BiMap;

use crate::lir::BlockId;

/// Source-level block labels.
#[derive(Clone, Debug, Default)]
pub struct Names {
    labels: BiMap<String, BlockId>,
}

impl Names {
    pub fn new() -> Self {
        Self {
            labels: BiMap::new(),
        }
    }

    /// Get the block labelled `label`, or name `fresh` with it.
    pub fn intern(&mut self, label: &str, fresh: BlockId) -> BlockId {
        if let Some(id) = self.labels.get_by_left(label) {
            return *id;
        }

        self.labels.insert(label.to_string(), fresh);
        fresh
    }

    pub fn add(&mut self, label: impl Into<String>, id: BlockId) {
        self.labels.insert(label.into(), id);
    }

    pub fn lookup(&self, label: &str) -> Option<BlockId> {
        self.labels.get_by_left(label).copied()
    }

    pub fn label(&self, id: &BlockId) -> Option<&str> {
        self.labels.get_by_right(id).map(String::as_str)
    }

    /// The label of `id`, or a synthetic one for blocks without a source label.
    pub fn label_or_id(&self, id: &BlockId) -> String {
        self.label(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
