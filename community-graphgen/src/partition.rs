//! Deterministic split of node ids `1..=n` into contiguous communities.

use std::ops::Range;

use crate::error::{GeneratorError, Result};

/// Node identifier. Valid ids run from 1 to the node count inclusive.
pub type NodeId = u32;

/// Largest supported node count; ids stay representable one past the end.
pub const MAX_NODE_COUNT: u32 = u32::MAX - 1;

/// A contiguous block of node ids.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Community {
    index: usize,
    first: NodeId,
    len: u32,
}

impl Community {
    /// Position of this community in its partition, starting at 0.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Member ids in increasing order.
    #[must_use]
    pub const fn members(&self) -> Range<NodeId> {
        self.first..self.first + self.len
    }

    /// Number of members.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Whether the community has no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `node` belongs to this community.
    #[must_use]
    pub const fn contains(&self, node: NodeId) -> bool {
        node >= self.first && node < self.first + self.len
    }
}

/// Ordered communities covering `1..=n` exactly once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    node_count: u32,
    communities: Vec<Community>,
}

impl Partition {
    /// Total number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Communities in id order.
    #[must_use]
    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    /// Number of communities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// Whether the partition holds no communities. Never true for a value
    /// produced by [`partition`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Community containing `node`, or `None` when `node` is out of range.
    #[must_use]
    pub fn community_of(&self, node: NodeId) -> Option<&Community> {
        let position = self
            .communities
            .partition_point(|community| community.first + community.len <= node);
        self.communities
            .get(position)
            .filter(|community| community.contains(node))
    }

    /// Member lists, one per community, each in increasing order.
    #[must_use]
    pub fn member_lists(&self) -> Vec<Vec<NodeId>> {
        self.communities
            .iter()
            .map(|community| community.members().collect())
            .collect()
    }
}

/// Split nodes `1..=n` into `k` contiguous communities.
///
/// Every community receives `n / k` nodes and the first `n % k` receive one
/// more, so sizes differ by at most one. No randomness is involved. When
/// `k > n` the trailing communities are empty; callers normally clamp `k`
/// with [`crate::CommunityRange`] first.
///
/// # Errors
/// Returns [`GeneratorError::InvalidNodeCount`] when `n` is zero or above
/// [`MAX_NODE_COUNT`], and
/// [`GeneratorError::InvalidCommunityCount`] when `k == 0`.
pub fn partition(n: u32, k: u32) -> Result<Partition> {
    if n == 0 || n > MAX_NODE_COUNT {
        return Err(GeneratorError::InvalidNodeCount { got: n });
    }
    if k == 0 {
        return Err(GeneratorError::InvalidCommunityCount { got: k });
    }

    let base = n / k;
    let extra = n % k;
    let mut next: NodeId = 1;
    let communities = (0..k)
        .map(|index| {
            let len = if index < extra { base + 1 } else { base };
            let community = Community {
                index: index as usize,
                first: next,
                len,
            };
            next += len;
            community
        })
        .collect();

    Ok(Partition {
        node_count: n,
        communities,
    })
}
