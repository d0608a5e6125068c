use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distinct agent indices collected by a neighbor query.
///
/// Keeps insertion order so that anything folding over the set (force
/// accumulation in particular) is reproducible from run to run. Membership
/// is tracked separately so inserts stay constant time for large neighbor
/// counts. Serialized as the ordered index list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct NeighborSet {
    indices: Vec<usize>,
    members: HashSet<usize>,
}

impl NeighborSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Adds `index`, returning `true` if it was not already present.
    pub fn insert(&mut self, index: usize) -> bool {
        if !self.members.insert(index) {
            return false;
        }
        self.indices.push(index);
        true
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}

impl FromIterator<usize> for NeighborSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = NeighborSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl From<Vec<usize>> for NeighborSet {
    fn from(indices: Vec<usize>) -> Self {
        indices.into_iter().collect()
    }
}

impl From<NeighborSet> for Vec<usize> {
    fn from(set: NeighborSet) -> Self {
        set.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = NeighborSet::new();
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let set: NeighborSet = [5, 2, 9, 2, 5].into_iter().collect();
        assert_eq!(set.as_slice(), &[5, 2, 9]);
    }

    #[test]
    fn test_clear() {
        let mut set: NeighborSet = [1, 2].into_iter().collect();
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(1));
    }

    #[test]
    fn test_large_set_dedups_and_keeps_order() {
        let count = 20_000;
        let mut set = NeighborSet::with_capacity(count);
        for i in (0..count).rev() {
            assert!(set.insert(i));
        }
        for i in 0..count {
            assert!(!set.insert(i));
        }
        assert_eq!(set.len(), count);
        assert_eq!(set.as_slice()[0], count - 1);
        assert_eq!(set.as_slice()[count - 1], 0);
        assert!(set.contains(count / 2));
        assert!(!set.contains(count));
    }

    #[test]
    fn test_serde_keeps_membership() {
        let set: NeighborSet = [4, 7, 4, 1].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[4,7,1]");
        let mut back: NeighborSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(back.contains(7));
        assert!(!back.insert(1));
    }
}
