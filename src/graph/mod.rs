//! The block graph: an arena of blocks with exclusive slot ownership.
//!
//! Blocks live in a single map keyed by id. A slot holds the id of the
//! block attached to it, and the `owners` map records the reverse edge so
//! every block has at most one owner. Blocks without an owner are the
//! standalone roots, kept in canvas order.

mod display;
pub mod drop_target;
mod editor;
mod tree;

pub use display::DisplayGraph;
pub use drop_target::resolve_drop_target;
pub use editor::{DropSource, DropTarget, GraphEditor};
pub use tree::{AttachedTree, BlockTree};

use crate::block::{Block, BlockId, BlockKind, Slot};
use ahash::AHashMap;

/// Addresses one slot of one block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub block_id: BlockId,
    pub slot_id: String,
}

impl SlotRef {
    pub fn new(block_id: impl Into<BlockId>, slot_id: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            slot_id: slot_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: AHashMap<BlockId, Block>,
    roots: Vec<BlockId>,
    owners: AHashMap<BlockId, SlotRef>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Ids of the standalone blocks, in canvas order.
    pub fn root_ids(&self) -> &[BlockId] {
        &self.roots
    }

    /// Standalone blocks, in canvas order.
    pub fn roots(&self) -> impl Iterator<Item = &Block> {
        self.roots
            .iter()
            .filter(|id| !self.owners.contains_key(id.as_str()))
            .filter_map(|id| self.blocks.get(id))
    }

    pub fn owner_of(&self, id: &str) -> Option<&SlotRef> {
        self.owners.get(id)
    }

    pub fn is_standalone(&self, id: &str) -> bool {
        self.contains(id) && !self.owners.contains_key(id)
    }

    /// The block attached to `slot_id` on `block_id`, if any.
    pub fn attached_to(&self, block_id: &str, slot_id: &str) -> Option<&Block> {
        self.get(block_id)?
            .slot(slot_id)?
            .attached()
            .and_then(|id| self.get(id))
    }

    /// Occupied slots of a block paired with the blocks they hold.
    pub fn children<'g>(&'g self, id: &str) -> Vec<(&'g Slot, &'g Block)> {
        let Some(block) = self.get(id) else {
            return Vec::new();
        };
        block
            .slots
            .iter()
            .filter_map(|slot| {
                slot.attached()
                    .and_then(|child| self.get(child))
                    .map(|child| (slot, child))
            })
            .collect()
    }

    /// Number of ancestors above a block; roots have depth zero.
    pub fn depth(&self, id: &str) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(owner) = self.owners.get(current) {
            depth += 1;
            current = owner.block_id.as_str();
            if depth > self.blocks.len() {
                break;
            }
        }
        depth
    }

    /// True when `id` is `ancestor` or sits somewhere beneath it.
    pub fn is_within(&self, id: &str, ancestor: &str) -> bool {
        let mut current = id;
        let mut steps = 0;
        loop {
            if current == ancestor {
                return true;
            }
            match self.owners.get(current) {
                Some(owner) => current = owner.block_id.as_str(),
                None => return false,
            }
            steps += 1;
            if steps > self.blocks.len() {
                return false;
            }
        }
    }

    /// Ids of a block and all of its descendants, parent first.
    pub fn subtree_ids(&self, id: &str) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(block) = self.blocks.get(&current) {
                stack.extend(block.attached_ids().rev().map(str::to_string));
                out.push(current);
            }
        }
        out
    }

    /// A standalone condition or operator other than `excluding`.
    ///
    /// Its presence blocks another condition from landing on the canvas.
    pub fn conflicting_root(&self, excluding: Option<&str>) -> Option<&Block> {
        self.roots().find(|block| {
            Some(block.id.as_str()) != excluding
                && matches!(block.kind(), BlockKind::Condition | BlockKind::Operator)
        })
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<BlockId> {
        &mut self.roots
    }

    /// Adds a block to the arena without linking it anywhere.
    pub(crate) fn insert(&mut self, block: Block) {
        self.blocks.insert(block.id.clone(), block);
    }

    pub(crate) fn link_root(&mut self, id: &str) {
        if !self.roots.iter().any(|r| r == id) {
            self.roots.push(id.to_string());
        }
    }

    pub(crate) fn link_slot(&mut self, id: &str, target: &SlotRef) {
        if let Some(slot) = self
            .blocks
            .get_mut(&target.block_id)
            .and_then(|b| b.slot_mut(&target.slot_id))
        {
            slot.attached = Some(id.to_string());
            self.owners.insert(id.to_string(), target.clone());
        }
    }

    /// Detaches a block from its owner slot or from the canvas.
    ///
    /// The block and its subtree stay in the arena.
    pub(crate) fn unlink(&mut self, id: &str) -> Option<SlotRef> {
        match self.owners.remove(id) {
            Some(owner) => {
                if let Some(slot) = self
                    .blocks
                    .get_mut(&owner.block_id)
                    .and_then(|b| b.slot_mut(&owner.slot_id))
                {
                    slot.attached = None;
                }
                Some(owner)
            }
            None => {
                self.roots.retain(|r| r != id);
                None
            }
        }
    }

    /// Unlinks a block and removes it and every descendant from the arena.
    pub(crate) fn remove_subtree(&mut self, id: &str) -> Vec<Block> {
        let ids = self.subtree_ids(id);
        self.unlink(id);
        ids.iter()
            .filter_map(|id| {
                self.owners.remove(id);
                self.blocks.remove(id)
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.roots.clear();
        self.owners.clear();
    }
}
