use stargram_common::{model::Id, unique_id::UniqueIdGenerator};
use std::sync::{Mutex, PoisonError};

/// Shared source of fresh ids for new documents, files and accounts.
#[derive(Debug)]
pub struct IdSource {
    generator: Mutex<UniqueIdGenerator>,
}

impl IdSource {
    #[must_use]
    pub fn new(generator: UniqueIdGenerator) -> Self {
        Self {
            generator: Mutex::new(generator),
        }
    }

    pub fn next<Marker>(&self) -> Id<Marker> {
        // The generator holds no invariant a panicking holder could break.
        self.generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::new(UniqueIdGenerator::random())
    }
}
