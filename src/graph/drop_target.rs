//! Picks the single target that receives a drop when zones overlap.
//!
//! Every slot under the pointer reports itself as a hit, along with the
//! canvas. Only the innermost empty slot that accepts the dragged kind
//! handles the drop; the canvas is the fallback. A slot held by the block
//! being moved still counts as empty.

use super::{BlockGraph, DropTarget};
use crate::block::BlockKind;
use itertools::Itertools;

pub fn resolve_drop_target(
    graph: &BlockGraph,
    kind: BlockKind,
    moving: Option<&str>,
    hits: &[DropTarget],
) -> Option<DropTarget> {
    let slot = hits
        .iter()
        .filter_map(|hit| match hit {
            DropTarget::Slot(slot_ref) => Some(slot_ref),
            DropTarget::Canvas => None,
        })
        .filter(|slot_ref| {
            graph
                .get(&slot_ref.block_id)
                .and_then(|block| block.slot(&slot_ref.slot_id))
                .is_some_and(|slot| {
                    slot.accepts(kind) && slot.attached().is_none_or(|o| Some(o) == moving)
                })
        })
        .sorted_by_key(|slot_ref| std::cmp::Reverse(graph.depth(&slot_ref.block_id)))
        .next();

    match slot {
        Some(slot_ref) => Some(DropTarget::Slot(slot_ref.clone())),
        None if hits.contains(&DropTarget::Canvas) => Some(DropTarget::Canvas),
        None => None,
    }
}
