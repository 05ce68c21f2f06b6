//! Block vocabulary: kinds, slots, payloads and the template palette.

mod definition;
mod id;
pub mod palette;

pub use definition::{
    Block, BlockId, BlockKind, BlockPayload, Category, ConditionProperties, InputType,
    OperatorProperties, Slot,
};
pub use id::{IdGenerator, SequentialIds};
pub use palette::Preset;
