use serde::{Deserialize, Serialize};

/// Epoch assigned by the protocol to a unit of snapshot work.
///
/// `begin` and `end` are source chain block heights. Epoch id 0 marks a simulation
/// (dry-run) submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch_id: u64,
    pub begin: u64,
    pub end: u64,
}

impl EpochInfo {
    pub fn new(epoch_id: u64, begin: u64, end: u64) -> Self {
        Self { epoch_id, begin, end }
    }

    pub fn is_simulation(&self) -> bool {
        self.epoch_id == 0
    }
}
