//! `Operation` selects how a [`crate::repository::Repository`] call should
//! use its underlying network and storage tiers.

/// Tiering strategy for a single repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Network only.
    Network,
    /// Storage only.
    Storage,
    /// Network first, writing the result through to storage (reads) or
    /// requiring network success before the storage write proceeds
    /// (writes/deletes).
    NetworkSync,
    /// Storage first, falling back to network on `NotFound`/`NotValid`
    /// (reads); storage first, then writing the confirmed value through to
    /// network (writes/deletes) — the mirror image of `NetworkSync`.
    StorageSync,
    /// No tiering preference; meaningful only to single-source
    /// repositories, which ignore the `Operation` argument entirely.
    Blank,
    /// Use whatever the repository's own configured default is.
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_is_copy_and_comparable() {
        let a = Operation::NetworkSync;
        let b = a;
        assert_eq!(a, b);
        assert_ne!(Operation::Network, Operation::Storage);
    }
}
