//! Compressed root to leaf paths.
//!
//! A [`Vector`] records the leaf reached by walking a key down the tree
//! (`endpoint`), a bitmask with one bit set per branch depth passed on the
//! way (`markers`) and the identifier of the subtree not taken at each of
//! those branches (`waypoints`, shallowest first).
//!
//! This is enough to fold back up to the root identifier, so a vector is
//! both a membership or non-membership proof and the working object that
//! insertions and removals are computed on.
use std::sync::OnceLock;

use crate::hash::{FixedHash, HASH_SIZE};
use crate::node::Node;
use crate::{IndexError, Result};

#[derive(Debug, Clone)]
pub struct Vector {
    path: FixedHash,
    endpoint: Node,
    markers: FixedHash,
    waypoints: Vec<FixedHash>,
    nodes: OnceLock<Vec<Node>>,
}

impl Vector {
    /// Creates a vector ending in the leaf `(path, pointer)`.
    pub fn new(
        path: FixedHash,
        pointer: FixedHash,
        markers: FixedHash,
        waypoints: Vec<FixedHash>,
    ) -> Result<Self> {
        Self::checked(Node::leaf(path, pointer), path, markers, waypoints)
    }

    /// Creates a vector ending in an already persisted subtree `nid`
    /// positioned at `path`.
    pub fn stub(
        nid: FixedHash,
        path: FixedHash,
        markers: FixedHash,
        waypoints: Vec<FixedHash>,
    ) -> Result<Self> {
        Self::checked(Node::stub(nid, path), path, markers, waypoints)
    }

    fn checked(
        endpoint: Node,
        path: FixedHash,
        markers: FixedHash,
        waypoints: Vec<FixedHash>,
    ) -> Result<Self> {
        if markers.ones() != waypoints.len() {
            return Err(IndexError::MalformedVector(
                "marker and waypoint counts differ",
            ));
        }
        Ok(Self::from_parts(endpoint, path, markers, waypoints))
    }

    fn from_parts(
        endpoint: Node,
        path: FixedHash,
        markers: FixedHash,
        waypoints: Vec<FixedHash>,
    ) -> Self {
        Self {
            path,
            endpoint,
            markers,
            waypoints,
            nodes: OnceLock::new(),
        }
    }

    /// Key of the endpoint. For a non-membership proof this differs from
    /// the key that was looked up.
    pub fn path(&self) -> FixedHash {
        self.path
    }

    /// Value pointer of the endpoint, zero for a stub endpoint.
    pub fn pointer(&self) -> FixedHash {
        self.endpoint.pointer().unwrap_or(FixedHash::ZERO)
    }

    pub fn endpoint(&self) -> &Node {
        &self.endpoint
    }

    pub fn markers(&self) -> FixedHash {
        self.markers
    }

    pub fn waypoints(&self) -> &[FixedHash] {
        &self.waypoints
    }

    /// Ascending list of branch depths on the path.
    pub fn progression(&self) -> Vec<usize> {
        self.markers.set_bits()
    }

    /// Deepest branch depth on the path.
    pub fn marker(&self) -> Option<usize> {
        self.markers.lsb()
    }

    /// Sibling at the deepest branch.
    pub fn waypoint(&self) -> Option<FixedHash> {
        self.waypoints.last().copied()
    }

    /// Every node on the path, root first and endpoint last, rebuilt by
    /// folding the waypoints from the deepest marker up.
    pub fn nodes(&self) -> &[Node] {
        self.nodes.get_or_init(|| {
            let mut nodes = Vec::with_capacity(self.waypoints.len() + 1);
            nodes.push(self.endpoint.clone());
            let mut current = self.endpoint.nid();
            for (marker, waypoint) in self
                .progression()
                .into_iter()
                .zip(self.waypoints.iter())
                .rev()
            {
                let node = Node::branch(&self.path, current, *waypoint, marker as u8);
                current = node.nid();
                nodes.push(node);
            }
            nodes.reverse();
            nodes
        })
    }

    /// Root node of the path.
    pub fn origin(&self) -> &Node {
        // nodes() always holds at least the endpoint
        &self.nodes()[0]
    }

    /// Identifier of the root node.
    pub fn root(&self) -> FixedHash {
        self.origin().nid()
    }

    /// Whether `path` takes the same side as this vector's path at every
    /// branch recorded in `markers`.
    pub fn contains(&self, path: &FixedHash) -> bool {
        ((self.path ^ *path) & self.markers).is_zero()
    }

    /// Returns the vector obtained by inserting `(path, pointer)`.
    ///
    /// The new branch goes at the first bit where `path` leaves the
    /// endpoint key. Every marker deeper than that bit is folded into a
    /// single waypoint, the old endpoint's subtree, which becomes the
    /// sibling of the new leaf.
    pub fn insert(&self, path: &FixedHash, pointer: FixedHash) -> Result<Self> {
        if !self.contains(path) {
            return Err(IndexError::PathNotContained(*path));
        }
        let Some(marker) = self.path.compare(path) else {
            return Ok(self.update(pointer));
        };

        let progression = self.progression();
        let mut markers = self.markers;
        markers.on(marker)?;

        let mut subtree = self.endpoint.nid();
        let mut shallower = progression.len();
        while shallower > 0 && progression[shallower - 1] > marker {
            shallower -= 1;
            let depth = progression[shallower];
            markers.off(depth)?;
            let branch = Node::branch(&self.path, subtree, self.waypoints[shallower], depth as u8);
            subtree = branch.nid();
        }

        let mut waypoints = self.waypoints[..shallower].to_vec();
        waypoints.push(subtree);
        Ok(Self::from_parts(
            Node::leaf(*path, pointer),
            *path,
            markers,
            waypoints,
        ))
    }

    /// Returns the vector with the endpoint's pointer replaced.
    pub fn update(&self, pointer: FixedHash) -> Self {
        Self::from_parts(
            Node::leaf(self.path, pointer),
            self.path,
            self.markers,
            self.waypoints.clone(),
        )
    }

    /// Returns the vector obtained by removing the endpoint.
    ///
    /// The sibling at the deepest branch takes that branch's place, so the
    /// result ends in a stub for the sibling. `Ok(None)` means the endpoint
    /// was the only leaf and the tree is now empty.
    pub fn remove(&self, path: &FixedHash) -> Result<Option<Self>> {
        if self.path != *path {
            return Err(IndexError::UnremovableKey(*path));
        }
        let Some((sibling, waypoints)) = self.waypoints.split_last() else {
            return Ok(None);
        };
        let Some(marker) = self.marker() else {
            return Ok(None);
        };

        let mut markers = self.markers;
        markers.off(marker)?;
        Self::stub(*sibling, self.path, markers, waypoints.to_vec()).map(Some)
    }

    /// Membership check: the endpoint matches the optional `path` and
    /// `pointer` and the folded root is `root`.
    pub fn verify(
        &self,
        root: &FixedHash,
        path: Option<&FixedHash>,
        pointer: Option<&FixedHash>,
    ) -> bool {
        path.map_or(true, |path| *path == self.path)
            && pointer.map_or(true, |pointer| *pointer == self.pointer())
            && self.root() == *root
    }

    /// Non-membership check: `path` would end at this endpoint, the endpoint
    /// holds another key and the folded root is `root`.
    pub fn excludes(&self, root: &FixedHash, path: &FixedHash) -> bool {
        self.contains(path) && self.path != *path && self.root() == *root
    }

    /// Flat form `[path, pointer, markers, waypoint_0, ..]`.
    pub fn encoded(&self) -> Vec<FixedHash> {
        let mut encoded = Vec::with_capacity(self.waypoints.len() + 3);
        encoded.extend([self.path, self.pointer(), self.markers]);
        encoded.extend_from_slice(&self.waypoints);
        encoded
    }

    pub fn from_encoded(encoded: &[FixedHash]) -> Result<Self> {
        match encoded {
            [path, pointer, markers, waypoints @ ..] => {
                Self::new(*path, *pointer, *markers, waypoints.to_vec())
            }
            _ => Err(IndexError::MalformedVector(
                "expected path, pointer and markers",
            )),
        }
    }

    /// [`Vector::encoded`] as concatenated 32 byte elements.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encoded()
            .iter()
            .flat_map(|element| element.into_bytes())
            .collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % HASH_SIZE != 0 {
            return Err(IndexError::MalformedVector(
                "length is not a multiple of 32",
            ));
        }
        let encoded = bytes
            .chunks_exact(HASH_SIZE)
            .map(FixedHash::from_slice)
            .collect::<Vec<_>>();
        Self::from_encoded(&encoded)
    }
}
