use super::{BlockGraph, BlockTree, SlotRef, resolve_drop_target};
use crate::block::{
    Block, BlockId, BlockKind, BlockPayload, IdGenerator, Preset, SequentialIds, Slot, palette,
};
use crate::condition::{Comparator, ConditionType};
use crate::error::EditorError;
use std::fmt;
use tracing::{debug, info};

/// What is being dropped.
#[derive(Debug, Clone)]
pub enum DropSource<'a> {
    /// A palette template; a fresh instance is minted on drop.
    Template(&'a Block),
    /// A block already in the graph, relocated on drop.
    Existing(BlockId),
    /// A previously detached subtree.
    Tree(BlockTree),
}

impl<'a> From<&'a Block> for DropSource<'a> {
    fn from(block: &'a Block) -> Self {
        if block.template {
            DropSource::Template(block)
        } else {
            DropSource::Existing(block.id.clone())
        }
    }
}

impl From<BlockTree> for DropSource<'_> {
    fn from(tree: BlockTree) -> Self {
        DropSource::Tree(tree)
    }
}

impl DropSource<'_> {
    fn kind(&self, graph: &BlockGraph) -> Option<BlockKind> {
        match self {
            DropSource::Template(block) => Some(block.kind()),
            DropSource::Existing(id) => graph.get(id).map(Block::kind),
            DropSource::Tree(tree) => Some(tree.block.kind()),
        }
    }
}

/// Where a drop lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Canvas,
    Slot(SlotRef),
}

impl DropTarget {
    pub fn slot(block_id: &str, slot_id: &str) -> Self {
        DropTarget::Slot(SlotRef::new(block_id, slot_id))
    }
}

/// Owns the block graph and applies every mutation to it.
///
/// Each operation either applies completely or returns an error and leaves
/// the graph untouched.
pub struct GraphEditor {
    graph: BlockGraph,
    ids: Box<dyn IdGenerator>,
    revision: u64,
}

impl fmt::Debug for GraphEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEditor")
            .field("graph", &self.graph)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Default for GraphEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphEditor {
    pub fn new() -> Self {
        Self::with_id_generator(SequentialIds::new())
    }

    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            graph: BlockGraph::new(),
            ids: Box::new(ids),
            revision: 0,
        }
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    /// Bumped by every applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drops a template, an existing block or a detached subtree on a target.
    ///
    /// Returns the id of the block now occupying the target.
    pub fn attach<'a>(
        &mut self,
        source: impl Into<DropSource<'a>>,
        target: DropTarget,
    ) -> Result<BlockId, EditorError> {
        match source.into() {
            DropSource::Template(template) => self.attach_template(template, target),
            DropSource::Existing(id) => self.relocate(&id, target),
            DropSource::Tree(tree) => self.attach_tree(tree, target),
        }
    }

    /// Resolves overlapping drop zones, then attaches to the winner.
    ///
    /// Returns `Ok(None)` when no hit accepts the source.
    pub fn drop_on<'a>(
        &mut self,
        source: impl Into<DropSource<'a>>,
        hits: &[DropTarget],
    ) -> Result<Option<BlockId>, EditorError> {
        let source = source.into();
        let Some(kind) = source.kind(&self.graph) else {
            if let DropSource::Existing(id) = source {
                return Err(EditorError::BlockNotFound(id));
            }
            return Ok(None);
        };
        let moving = match &source {
            DropSource::Existing(id) => Some(id.as_str()),
            _ => None,
        };
        match resolve_drop_target(&self.graph, kind, moving, hits) {
            Some(target) => self.attach(source, target).map(Some),
            None => Ok(None),
        }
    }

    /// Removes a block and its descendants, returning them as an intact tree.
    pub fn detach(&mut self, id: &str) -> Result<BlockTree, EditorError> {
        let tree = self
            .graph
            .to_tree(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        let removed = self.graph.remove_subtree(id);
        debug!(block = id, removed = removed.len(), "detached subtree");
        self.revision += 1;
        Ok(tree)
    }

    /// Moves a standalone block to a new position in canvas order.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        let len = self.graph.root_ids().len();
        for index in [from, to] {
            if index >= len {
                return Err(EditorError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let roots = self.graph.roots_mut();
        let id = roots.remove(from);
        roots.insert(to, id);
        self.revision += 1;
        Ok(())
    }

    /// Replaces the raw text of a value block.
    pub fn set_value(&mut self, id: &str, raw: &str) -> Result<(), EditorError> {
        let block = self
            .graph
            .get_mut(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        match &mut block.payload {
            BlockPayload::Value { raw: current, .. } => *current = raw.to_string(),
            _ => return Err(EditorError::NotAValueBlock(id.to_string())),
        }
        self.revision += 1;
        Ok(())
    }

    /// Stores text typed directly into a slot. An empty string clears it.
    pub fn set_slot_literal(
        &mut self,
        block_id: &str,
        slot_id: &str,
        raw: &str,
    ) -> Result<(), EditorError> {
        let slot = self.slot_mut(block_id, slot_id)?;
        slot.literal = (!raw.is_empty()).then(|| raw.to_string());
        self.revision += 1;
        Ok(())
    }

    pub fn set_comparator(
        &mut self,
        block_id: &str,
        slot_id: &str,
        comparator: Comparator,
    ) -> Result<(), EditorError> {
        let slot = self.slot_mut(block_id, slot_id)?;
        slot.comparator = Some(comparator);
        self.revision += 1;
        Ok(())
    }

    /// Appends a `param_N` slot to a JSON-RPC condition.
    pub fn add_parameter_slot(&mut self, block_id: &str) -> Result<String, EditorError> {
        let block = self
            .graph
            .get_mut(block_id)
            .ok_or_else(|| EditorError::BlockNotFound(block_id.to_string()))?;
        let is_json_rpc = block
            .condition()
            .is_some_and(|props| props.condition_type == ConditionType::JsonRpc);
        if !is_json_rpc {
            return Err(EditorError::NotAJsonRpcBlock(block_id.to_string()));
        }

        let next = block
            .slots
            .iter()
            .filter_map(|s| s.id.strip_prefix("param_")?.parse::<usize>().ok())
            .max()
            .map_or(0, |n| n + 1);
        let position = block
            .slots
            .iter()
            .rposition(|s| s.id.starts_with("param_"))
            .map_or(block.slots.len(), |i| i + 1);
        let slot_id = format!("param_{}", next);
        block.slots.insert(
            position,
            Slot::value(&slot_id, &format!("Parameter {}", next + 1)),
        );
        self.revision += 1;
        Ok(slot_id)
    }

    /// Drops a canned arrangement; the root follows the usual canvas rules.
    pub fn apply_preset(&mut self, preset: &Preset) -> Result<BlockId, EditorError> {
        match preset {
            Preset::TimelockNow { chain, now } => {
                let lock = self.attach(&palette::time_lock(), DropTarget::Canvas)?;
                let chain_value =
                    self.attach(&palette::number_value(), DropTarget::slot(&lock, "chain"))?;
                self.set_value(&chain_value, &chain.to_string())?;
                let timestamp = self.attach(
                    &palette::number_value(),
                    DropTarget::slot(&lock, "minTimestamp"),
                )?;
                self.set_value(&timestamp, &now.to_string())?;
                info!(block = %lock, chain, now, "applied timelock preset");
                Ok(lock)
            }
        }
    }

    /// Replaces the whole graph with imported trees.
    pub fn import(&mut self, trees: Vec<BlockTree>) -> Result<(), EditorError> {
        self.graph = BlockGraph::from_trees(trees)?;
        self.revision += 1;
        Ok(())
    }

    pub fn export(&self) -> Vec<BlockTree> {
        self.graph.to_trees()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.revision += 1;
        info!("cleared workspace");
    }

    fn attach_template(
        &mut self,
        template: &Block,
        target: DropTarget,
    ) -> Result<BlockId, EditorError> {
        self.check_target(template.kind(), &target, None)?;
        let id = self.mint_id(&template.id);
        self.graph.insert(template.instantiate(id.clone()));
        self.place(&id, &target);
        debug!(template = %template.id, block = %id, "instantiated template");
        self.revision += 1;
        Ok(id)
    }

    fn relocate(&mut self, id: &str, target: DropTarget) -> Result<BlockId, EditorError> {
        let block = self
            .graph
            .get(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        let kind = block.kind();

        let unchanged = match &target {
            DropTarget::Canvas => self.graph.is_standalone(id),
            DropTarget::Slot(slot_ref) => self.graph.owner_of(id) == Some(slot_ref),
        };
        if unchanged {
            return Ok(id.to_string());
        }

        self.check_target(kind, &target, Some(id))?;
        self.graph.unlink(id);
        self.place(id, &target);
        debug!(block = id, ?target, "relocated block");
        self.revision += 1;
        Ok(id.to_string())
    }

    fn attach_tree(
        &mut self,
        mut tree: BlockTree,
        target: DropTarget,
    ) -> Result<BlockId, EditorError> {
        self.check_target(tree.block.kind(), &target, None)?;

        let graph = &self.graph;
        let ids = &mut self.ids;
        tree.rekey(&mut |id: &str| {
            graph.contains(id).then(|| loop {
                let fresh = ids.next_id(id);
                if !graph.contains(&fresh) {
                    break fresh;
                }
            })
        });

        let mut staged = self.graph.clone();
        let owner = match &target {
            DropTarget::Canvas => None,
            DropTarget::Slot(slot_ref) => Some(slot_ref),
        };
        let id = staged.insert_tree(tree, owner)?;
        if let Some(slot_ref) = owner {
            grow_operator(&mut staged, slot_ref);
        }
        self.graph = staged;
        self.revision += 1;
        Ok(id)
    }

    /// Checks a drop against the slot contract, the canvas rule and cycles.
    fn check_target(
        &self,
        kind: BlockKind,
        target: &DropTarget,
        moving: Option<&str>,
    ) -> Result<(), EditorError> {
        match target {
            DropTarget::Canvas => {
                if kind == BlockKind::Condition {
                    if let Some(existing) = self.graph.conflicting_root(moving) {
                        info!(existing = %existing.id, "rejected second standalone condition");
                        return Err(EditorError::TopLevelConflict {
                            existing_root: existing.id.clone(),
                        });
                    }
                }
                Ok(())
            }
            DropTarget::Slot(slot_ref) => {
                let block = self
                    .graph
                    .get(&slot_ref.block_id)
                    .ok_or_else(|| EditorError::BlockNotFound(slot_ref.block_id.clone()))?;
                if block.kind() == BlockKind::Value {
                    return Err(EditorError::NotADropTarget(block.id.clone()));
                }
                let slot = block
                    .slot(&slot_ref.slot_id)
                    .ok_or_else(|| EditorError::SlotNotFound {
                        block_id: slot_ref.block_id.clone(),
                        slot_id: slot_ref.slot_id.clone(),
                    })?;
                if !slot.accepts(kind) {
                    return Err(EditorError::SlotKindMismatch {
                        block_id: slot_ref.block_id.clone(),
                        slot_id: slot_ref.slot_id.clone(),
                        kind,
                    });
                }
                if let Some(occupant) = slot.attached().filter(|o| Some(*o) != moving) {
                    debug!(block = %slot_ref.block_id, slot = %slot_ref.slot_id, occupant, "rejected drop on occupied slot");
                    return Err(EditorError::SlotOccupied {
                        block_id: slot_ref.block_id.clone(),
                        slot_id: slot_ref.slot_id.clone(),
                        occupant: occupant.to_string(),
                    });
                }
                if let Some(moving) = moving {
                    if self.graph.is_within(&slot_ref.block_id, moving) {
                        return Err(EditorError::CycleDetected {
                            source_id: moving.to_string(),
                            target_id: slot_ref.block_id.clone(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Links an unlinked block at a target that `check_target` accepted.
    fn place(&mut self, id: &str, target: &DropTarget) {
        match target {
            DropTarget::Canvas => self.graph.link_root(id),
            DropTarget::Slot(slot_ref) => {
                self.graph.link_slot(id, slot_ref);
                grow_operator(&mut self.graph, slot_ref);
            }
        }
    }

    fn slot_mut(&mut self, block_id: &str, slot_id: &str) -> Result<&mut Slot, EditorError> {
        self.graph
            .get_mut(block_id)
            .ok_or_else(|| EditorError::BlockNotFound(block_id.to_string()))?
            .slot_mut(slot_id)
            .ok_or_else(|| EditorError::SlotNotFound {
                block_id: block_id.to_string(),
                slot_id: slot_id.to_string(),
            })
    }

    fn mint_id(&mut self, base: &str) -> BlockId {
        loop {
            let id = self.ids.next_id(base);
            if !self.graph.contains(&id) {
                return id;
            }
        }
    }
}

/// Appends an empty operand slot once an operator's last slot is filled.
fn grow_operator(graph: &mut BlockGraph, filled: &SlotRef) {
    let Some(block) = graph.get_mut(&filled.block_id) else {
        return;
    };
    let Some(max_operands) = block.operator().map(|props| props.max_operands) else {
        return;
    };
    let Some(last) = block.slots.last() else {
        return;
    };
    if last.id != filled.slot_id || max_operands.is_some_and(|max| block.slots.len() >= max) {
        return;
    }
    let slot = Slot::operand(&format!("condition-{}", block.slots.len() + 1), &last.label);
    block.slots.push(slot);
}
