use crate::condition::{ConditionDocument, ConditionType, Operator};
use crate::error::CompileError;
use crate::graph::BlockGraph;
use ahash::AHashMap;
use tracing::debug;

mod builder;
mod fields;
pub mod parsing;

use builder::DocumentBuilder;
pub use fields::{parse_loose, parse_number};
use parsing::register_default_parsers;
pub use parsing::{ConditionDraft, ConditionParser, OperatorParser};

/// Compiles a block graph into a condition document.
///
/// The compiler holds no per-graph state and can be reused for every
/// mutation of the graph.
pub struct Compiler {
    registry: AHashMap<ConditionType, Box<dyn ConditionParser>>,
}

pub struct CompilerBuilder {
    registry: AHashMap<ConditionType, Box<dyn ConditionParser>>,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerBuilder {
    pub fn new() -> Self {
        let mut registry: AHashMap<ConditionType, Box<dyn ConditionParser>> = AHashMap::new();
        register_default_parsers(&mut registry);
        Self { registry }
    }

    /// Replaces the parser for the parser's condition type.
    pub fn with_custom_parser(mut self, parser: Box<dyn ConditionParser>) -> Self {
        self.registry.insert(parser.condition_type(), parser);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            registry: self.registry,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    /// Compiles the whole graph.
    ///
    /// Branches that are incomplete or invalid compile to nothing and are
    /// omitted. Several standalone roots are combined under an implicit
    /// `and`; a single surviving root is returned as is.
    pub fn compile(&self, graph: &BlockGraph) -> Option<ConditionDocument> {
        let builder = DocumentBuilder::new(graph, &self.registry);
        let mut operands: Vec<ConditionDocument> = graph
            .roots()
            .filter_map(|root| match builder.build(root) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    debug!(root = %root.id, error = %e, "root did not compile");
                    None
                }
            })
            .collect();

        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(ConditionDocument::compound(Operator::And, operands)),
        }
    }

    /// Compiles the subtree under one block, reporting why it fails.
    pub fn compile_block(
        &self,
        graph: &BlockGraph,
        block_id: &str,
    ) -> Result<ConditionDocument, CompileError> {
        let block = graph
            .get(block_id)
            .ok_or_else(|| CompileError::BlockNotFound(block_id.to_string()))?;
        DocumentBuilder::new(graph, &self.registry).build(block)
    }
}
