use super::{BlockGraph, SlotRef};
use crate::block::{Block, BlockId};
use crate::error::EditorError;
use serde::{Deserialize, Serialize};

/// A block with its attached children embedded, for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTree {
    pub block: Block,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attached: Vec<AttachedTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedTree {
    pub slot_id: String,
    pub tree: BlockTree,
}

impl BlockTree {
    pub fn leaf(block: Block) -> Self {
        Self {
            block,
            attached: Vec::new(),
        }
    }

    /// Ids of every block in the tree, parent first.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = vec![self.block.id.as_str()];
        for child in &self.attached {
            out.extend(child.tree.ids());
        }
        out
    }

    /// Renames every block for which `rename` returns a new id.
    pub(crate) fn rekey(&mut self, rename: &mut dyn FnMut(&str) -> Option<BlockId>) {
        if let Some(id) = rename(&self.block.id) {
            self.block.id = id;
        }
        for child in &mut self.attached {
            child.tree.rekey(rename);
        }
    }
}

impl BlockGraph {
    /// Exports one block and its descendants.
    pub fn to_tree(&self, id: &str) -> Option<BlockTree> {
        let block = self.get(id)?;
        let attached = self
            .children(id)
            .into_iter()
            .filter_map(|(slot, child)| {
                self.to_tree(&child.id).map(|tree| AttachedTree {
                    slot_id: slot.id.clone(),
                    tree,
                })
            })
            .collect();
        Some(BlockTree {
            block: block.clone(),
            attached,
        })
    }

    /// Exports every standalone block, in canvas order.
    pub fn to_trees(&self) -> Vec<BlockTree> {
        self.root_ids()
            .iter()
            .filter_map(|id| self.to_tree(id))
            .collect()
    }

    /// Rebuilds a graph from nested trees, re-checking every ownership rule.
    pub fn from_trees(trees: Vec<BlockTree>) -> Result<BlockGraph, EditorError> {
        let mut graph = BlockGraph::new();
        for tree in trees {
            graph.insert_tree(tree, None)?;
        }
        Ok(graph)
    }

    /// Inserts a tree as a root (`owner == None`) or into an empty slot.
    ///
    /// On error the graph may be partially populated; callers stage on a copy.
    pub(crate) fn insert_tree(
        &mut self,
        tree: BlockTree,
        owner: Option<&SlotRef>,
    ) -> Result<BlockId, EditorError> {
        let BlockTree { mut block, attached } = tree;
        if block.template {
            return Err(EditorError::TemplateNotInGraph(block.id));
        }
        if self.contains(&block.id) {
            return Err(EditorError::InvalidTree(format!(
                "duplicate block id '{}'",
                block.id
            )));
        }

        match owner {
            None => {
                if block.kind() == crate::block::BlockKind::Condition {
                    if let Some(existing) = self.conflicting_root(None) {
                        return Err(EditorError::TopLevelConflict {
                            existing_root: existing.id.clone(),
                        });
                    }
                }
            }
            Some(target) => self.check_slot(target, &block)?,
        }

        for slot in &mut block.slots {
            slot.attached = None;
        }
        let id = block.id.clone();
        self.insert(block);
        match owner {
            None => self.link_root(&id),
            Some(target) => self.link_slot(&id, target),
        }

        for child in attached {
            let target = SlotRef::new(id.clone(), child.slot_id);
            self.insert_tree(child.tree, Some(&target))?;
        }
        Ok(id)
    }

    fn check_slot(&self, target: &SlotRef, block: &Block) -> Result<(), EditorError> {
        let owner = self
            .get(&target.block_id)
            .ok_or_else(|| EditorError::BlockNotFound(target.block_id.clone()))?;
        let slot = owner
            .slot(&target.slot_id)
            .ok_or_else(|| EditorError::SlotNotFound {
                block_id: target.block_id.clone(),
                slot_id: target.slot_id.clone(),
            })?;
        if !slot.accepts(block.kind()) {
            return Err(EditorError::SlotKindMismatch {
                block_id: target.block_id.clone(),
                slot_id: target.slot_id.clone(),
                kind: block.kind(),
            });
        }
        if slot.is_occupied() {
            return Err(EditorError::InvalidTree(format!(
                "slot '{}' on '{}' holds more than one block",
                target.slot_id, target.block_id
            )));
        }
        Ok(())
    }
}
