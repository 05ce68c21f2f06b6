use super::BlockId;

/// Source of fresh block ids for instantiated templates.
///
/// Injected into the editor so tests can predict ids.
pub trait IdGenerator: Send {
    fn next_id(&mut self, base: &str) -> BlockId;
}

/// Produces `{base}-{n}`; one counter is shared by every base.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(counter: u64) -> Self {
        Self { counter }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, base: &str) -> BlockId {
        self.counter += 1;
        format!("{}-{}", base, self.counter)
    }
}
