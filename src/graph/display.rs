use super::BlockGraph;
use crate::block::{Block, BlockPayload};
use std::fmt;

/// Renders the graph as an indented tree, one root per top-level branch.
pub struct DisplayGraph<'a> {
    pub graph: &'a BlockGraph,
}

impl<'a> fmt::Display for DisplayGraph<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots: Vec<&Block> = self.graph.roots().collect();
        if roots.is_empty() {
            return writeln!(f, "<empty>");
        }
        for (i, root) in roots.iter().enumerate() {
            self.fmt_as_tree(root, None, f, "", i + 1 == roots.len())?;
        }
        Ok(())
    }
}

impl<'a> DisplayGraph<'a> {
    fn fmt_as_tree(
        &self,
        block: &Block,
        slot_id: Option<&str>,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        if let Some(slot_id) = slot_id {
            write!(f, "[{}] ", slot_id)?;
        }

        match &block.payload {
            BlockPayload::Value { raw, .. } => writeln!(f, "{} = {:?}", block.id, raw)?,
            BlockPayload::Condition(props) => {
                writeln!(f, "{} ({}: {})", block.id, props.condition_type, block.label)?
            }
            BlockPayload::Operator(props) => {
                writeln!(f, "{} ({})", block.id, props.operator.as_str().to_uppercase())?
            }
        }

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let children = self.graph.children(&block.id);
        for (i, (slot, child)) in children.iter().enumerate() {
            self.fmt_as_tree(
                child,
                Some(&slot.id),
                f,
                &child_prefix,
                i + 1 == children.len(),
            )?;
        }
        Ok(())
    }
}
