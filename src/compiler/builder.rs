use super::fields::overlay;
use super::parsing::{ConditionParser, operator_parser};
use crate::block::{Block, BlockPayload, ConditionProperties, OperatorProperties};
use crate::condition::{ConditionDocument, ConditionType};
use crate::error::CompileError;
use crate::graph::BlockGraph;
use ahash::AHashMap;
use tracing::debug;

/// Walks the graph from one block down and builds its document.
pub(super) struct DocumentBuilder<'a> {
    graph: &'a BlockGraph,
    registry: &'a AHashMap<ConditionType, Box<dyn ConditionParser>>,
}

impl<'a> DocumentBuilder<'a> {
    pub(super) fn new(
        graph: &'a BlockGraph,
        registry: &'a AHashMap<ConditionType, Box<dyn ConditionParser>>,
    ) -> Self {
        Self { graph, registry }
    }

    pub(super) fn build(&self, block: &Block) -> Result<ConditionDocument, CompileError> {
        match &block.payload {
            BlockPayload::Operator(props) => self.build_compound(block, props),
            BlockPayload::Condition(props) => self.build_condition(block, props),
            BlockPayload::Value { .. } => Err(CompileError::UnsupportedBlock {
                block_id: block.id.clone(),
                kind: block.kind(),
            }),
        }
    }

    /// Compiles every attached operand; operands that fail are dropped.
    fn build_compound(
        &self,
        block: &Block,
        props: &OperatorProperties,
    ) -> Result<ConditionDocument, CompileError> {
        let attached: Vec<&Block> = block
            .attached_ids()
            .filter_map(|id| self.graph.get(id))
            .collect();

        let operands: Vec<ConditionDocument> = attached
            .iter()
            .filter_map(|child| match self.build(child) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    debug!(operator = %block.id, operand = %child.id, error = %e, "dropping operand");
                    None
                }
            })
            .collect();

        operator_parser(props.operator).parse(&block.id, attached.len(), operands)
    }

    fn build_condition(
        &self,
        block: &Block,
        props: &ConditionProperties,
    ) -> Result<ConditionDocument, CompileError> {
        let parser = self
            .registry
            .get(&props.condition_type)
            .ok_or_else(|| CompileError::NoParser(props.condition_type.to_string()))?;
        parser.parse(overlay(self.graph, block, props))
    }
}
