use crate::condition::{
    Comparator, ConditionType, Operator, ReturnValueTest, StandardContractType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub type BlockId = String;

/// What a block produces when it sits in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Value,
    Condition,
    Operator,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Value => "value",
            BlockKind::Condition => "condition",
            BlockKind::Operator => "operator",
        };
        f.write_str(name)
    }
}

/// Palette section a template is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Conditions,
    Operators,
    Values,
}

/// Hint for the literal editor of a slot or value block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Number,
}

/// A named input position on a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub accepted_kinds: Vec<BlockKind>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<Comparator>,
    /// Text typed directly into the slot; wins over an attached value block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(skip)]
    pub(crate) attached: Option<BlockId>,
}

impl Slot {
    /// A slot that takes a value block or an inline literal.
    pub fn value(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            accepted_kinds: vec![BlockKind::Value],
            label: label.to_string(),
            placeholder: None,
            input_type: Some(InputType::Text),
            comparator: None,
            literal: None,
            attached: None,
        }
    }

    /// A slot that takes a condition or an operator.
    pub fn operand(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            accepted_kinds: vec![BlockKind::Condition, BlockKind::Operator],
            label: label.to_string(),
            placeholder: None,
            input_type: None,
            comparator: None,
            literal: None,
            attached: None,
        }
    }

    pub fn numeric(mut self) -> Self {
        self.input_type = Some(InputType::Number);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn accepts(&self, kind: BlockKind) -> bool {
        self.accepted_kinds.contains(&kind)
    }

    /// Id of the block currently occupying this slot.
    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    pub fn is_occupied(&self) -> bool {
        self.attached.is_some()
    }
}

/// Static condition fields copied verbatim into the compiled document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionProperties {
    pub condition_type: ConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_contract_type: Option<StandardContractType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value_test: Option<ReturnValueTest>,
}

impl ConditionProperties {
    pub fn new(condition_type: ConditionType) -> Self {
        Self {
            condition_type,
            chain: None,
            method: None,
            parameters: None,
            standard_contract_type: None,
            return_value_test: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorProperties {
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_operands: Option<usize>,
}

/// Kind-specific data carried by a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockPayload {
    Value {
        #[serde(default)]
        raw: String,
        #[serde(default, rename = "inputType")]
        input_type: InputType,
    },
    Condition(ConditionProperties),
    Operator(OperatorProperties),
}

/// A node of the block graph, or a palette template when `template` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub template: bool,
    pub category: Category,
    pub label: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
    pub payload: BlockPayload,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self.payload {
            BlockPayload::Value { .. } => BlockKind::Value,
            BlockPayload::Condition(_) => BlockKind::Condition,
            BlockPayload::Operator(_) => BlockKind::Operator,
        }
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub(crate) fn slot_mut(&mut self, slot_id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == slot_id)
    }

    pub fn raw_value(&self) -> Option<&str> {
        match &self.payload {
            BlockPayload::Value { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn condition(&self) -> Option<&ConditionProperties> {
        match &self.payload {
            BlockPayload::Condition(props) => Some(props),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<&OperatorProperties> {
        match &self.payload {
            BlockPayload::Operator(props) => Some(props),
            _ => None,
        }
    }

    /// Ids of the blocks attached to this block's slots, in slot order.
    pub fn attached_ids(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.slots.iter().filter_map(Slot::attached)
    }

    /// Copies a template into a fresh, unattached graph block.
    pub(crate) fn instantiate(&self, id: BlockId) -> Block {
        let mut block = self.clone();
        block.id = id;
        block.template = false;
        for slot in &mut block.slots {
            slot.attached = None;
        }
        block
    }
}
