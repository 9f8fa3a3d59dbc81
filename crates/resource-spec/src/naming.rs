//! Unique resource name generation

use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Number of random hex characters appended to a prefix
const RANDOM_SUFFIX_LEN: usize = 8;

/// Produces resource names from a prefix
pub trait NameGenerator: Send + Sync {
    fn name(&self, prefix: &str) -> String;
}

impl<F> NameGenerator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn name(&self, prefix: &str) -> String {
        self(prefix)
    }
}

/// Prefix plus the first hex digits of a v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNames;

impl NameGenerator for RandomNames {
    fn name(&self, prefix: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}{}", prefix, &suffix[..RANDOM_SUFFIX_LEN])
    }
}

/// Prefix plus a process-local counter, starting at 1
#[derive(Debug, Default)]
pub struct SequentialNames {
    counter: AtomicU32,
}

impl SequentialNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameGenerator for SequentialNames {
    fn name(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", prefix, n)
    }
}
