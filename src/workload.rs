//! CPU-bound units of work.
//!
//! A workload takes no input, touches no shared state and throws its result
//! away. Results go through [`black_box`] so the loops survive optimization.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::hint::black_box;

const SHA256_SEED: &[u8] = b"a long string of initial data to make it a bit more work";

/// Which computation a task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// Integer accumulation over `0..iterations`
    Sum,
    /// Chained SHA-256: each round hashes the previous digest
    Sha256,
}

impl WorkloadKind {
    pub fn default_iterations(self) -> u64 {
        match self {
            WorkloadKind::Sum => 1_000_000_000,
            WorkloadKind::Sha256 => 500_000,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadKind::Sum => write!(f, "sum"),
            WorkloadKind::Sha256 => write!(f, "sha256"),
        }
    }
}

/// A workload kind paired with its iteration count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub iterations: u64,
}

impl Workload {
    pub fn new(kind: WorkloadKind, iterations: u64) -> Self {
        Self { kind, iterations }
    }

    /// Run the work once and discard the result.
    pub fn execute(&self) {
        match self.kind {
            WorkloadKind::Sum => {
                black_box(sum(self.iterations));
            }
            WorkloadKind::Sha256 => {
                black_box(sha256_chain(self.iterations));
            }
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        let kind = WorkloadKind::Sha256;
        Self::new(kind, kind.default_iterations())
    }
}

fn sum(iterations: u64) -> u64 {
    let mut total = 0u64;
    for i in 0..iterations {
        total = total.wrapping_add(black_box(i));
    }
    total
}

fn sha256_chain(iterations: u64) -> Vec<u8> {
    let mut hasher = Sha256::new();
    let mut data = SHA256_SEED.to_vec();
    for _ in 0..iterations {
        hasher.update(&data);
        data = hasher.finalize_reset().to_vec();
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_matches_closed_form() {
        assert_eq!(sum(0), 0);
        assert_eq!(sum(1), 0);
        assert_eq!(sum(101), 5050);
    }

    #[test]
    fn sha256_chain_is_deterministic() {
        assert_eq!(sha256_chain(64), sha256_chain(64));
        assert_ne!(sha256_chain(1), sha256_chain(2));
    }

    #[test]
    fn sha256_chain_feeds_digest_back() {
        assert_eq!(sha256_chain(0), SHA256_SEED);

        let first = Sha256::digest(SHA256_SEED).to_vec();
        assert_eq!(sha256_chain(1), first);

        let second = Sha256::digest(&first).to_vec();
        assert_eq!(sha256_chain(2), second);
    }

    #[test]
    fn default_workload_is_sha256() {
        let workload = Workload::default();
        assert_eq!(workload.kind, WorkloadKind::Sha256);
        assert_eq!(workload.iterations, 500_000);
    }

    #[test]
    fn execute_zero_iterations() {
        Workload::new(WorkloadKind::Sum, 0).execute();
        Workload::new(WorkloadKind::Sha256, 0).execute();
    }
}
