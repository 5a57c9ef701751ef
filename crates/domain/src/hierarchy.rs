use std::collections::{BTreeMap, BTreeSet, VecDeque};

use diagrid_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::principal::RoleId;

/// Directed hierarchy edge: holding `parent` implies every permission
/// reachable from `child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHierarchyEdge {
    /// Subsuming role.
    pub parent: RoleId,
    /// Subsumed role.
    pub child: RoleId,
    /// Advisory depth metadata for display only; never used by resolution.
    pub hierarchy_level: i32,
    /// Inactive edges are ignored by traversal.
    pub active: bool,
}

/// Node of the display-only forest view of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTreeNode {
    /// Role at this node.
    pub role: RoleId,
    /// Roles directly subsumed by this role.
    pub children: Vec<RoleTreeNode>,
}

/// Versioned, cycle-free role hierarchy.
///
/// The edge set is kept acyclic by checking reachability before every
/// insertion; a failed mutation leaves the graph unchanged. The version is
/// bumped on every structural change so closure caches can be discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleHierarchyGraph {
    children: BTreeMap<RoleId, BTreeMap<RoleId, i32>>,
    version: u64,
}

impl RoleHierarchyGraph {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a hierarchy from persisted edges.
    ///
    /// Trusts the stored edge set structurally; traversal stays defensive and
    /// terminates even if the data somehow contains a cycle.
    #[must_use]
    pub fn from_edges(version: u64, edges: impl IntoIterator<Item = RoleHierarchyEdge>) -> Self {
        let mut children: BTreeMap<RoleId, BTreeMap<RoleId, i32>> = BTreeMap::new();
        for edge in edges {
            if edge.active {
                children
                    .entry(edge.parent)
                    .or_default()
                    .insert(edge.child, edge.hierarchy_level);
            }
        }

        Self { children, version }
    }

    /// Returns the current graph version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns all edges, ordered by parent then child.
    #[must_use]
    pub fn edges(&self) -> Vec<RoleHierarchyEdge> {
        self.children
            .iter()
            .flat_map(|(parent, children)| {
                children.iter().map(|(child, level)| RoleHierarchyEdge {
                    parent: *parent,
                    child: *child,
                    hierarchy_level: *level,
                    active: true,
                })
            })
            .collect()
    }

    /// Inserts a `parent -> child` edge.
    ///
    /// Fails with [`AppError::InvalidEdge`] on a self-edge and with
    /// [`AppError::HierarchyCycle`] when `child` already reaches `parent`,
    /// in which case the error carries the existing path that would have
    /// closed the loop. The graph is unchanged on failure.
    pub fn insert_edge(&mut self, parent: RoleId, child: RoleId, level: i32) -> AppResult<()> {
        if parent == child {
            return Err(AppError::InvalidEdge(format!(
                "role '{parent}' cannot subsume itself"
            )));
        }

        if let Some(path) = self.path_between(child, parent) {
            return Err(AppError::HierarchyCycle {
                path: path.iter().map(ToString::to_string).collect(),
            });
        }

        let previous = self.children.entry(parent).or_default().insert(child, level);
        if previous != Some(level) {
            self.version += 1;
        }

        Ok(())
    }

    /// Removes a `parent -> child` edge. Idempotent; absent edges are ignored.
    pub fn remove_edge(&mut self, parent: RoleId, child: RoleId) {
        let removed = self
            .children
            .get_mut(&parent)
            .is_some_and(|children| children.remove(&child).is_some());

        if removed {
            if self
                .children
                .get(&parent)
                .is_some_and(BTreeMap::is_empty)
            {
                self.children.remove(&parent);
            }
            self.version += 1;
        }
    }

    /// Returns whether the `parent -> child` edge exists.
    #[must_use]
    pub fn contains_edge(&self, parent: RoleId, child: RoleId) -> bool {
        self.children
            .get(&parent)
            .is_some_and(|children| children.contains_key(&child))
    }

    /// Returns whether any edge references the role as parent or child.
    #[must_use]
    pub fn references_role(&self, role: RoleId) -> bool {
        self.children.contains_key(&role)
            || self
                .children
                .values()
                .any(|children| children.contains_key(&role))
    }

    /// Returns the role itself plus every role reachable along
    /// `parent -> child` edges.
    ///
    /// Breadth-first with a visited set, so it terminates even on an edge set
    /// that accidentally contains a cycle.
    #[must_use]
    pub fn closure(&self, role: RoleId) -> BTreeSet<RoleId> {
        let mut visited = BTreeSet::from([role]);
        let mut queue = VecDeque::from([role]);

        while let Some(current) = queue.pop_front() {
            if let Some(children) = self.children.get(&current) {
                for child in children.keys() {
                    if visited.insert(*child) {
                        queue.push_back(*child);
                    }
                }
            }
        }

        visited
    }

    /// Returns the union of closures of all given roles.
    #[must_use]
    pub fn closure_of_all(&self, roles: impl IntoIterator<Item = RoleId>) -> BTreeSet<RoleId> {
        let mut union = BTreeSet::new();
        for role in roles {
            union.append(&mut self.closure(role));
        }

        union
    }

    /// Returns the existing path `from -> .. -> to`, if one exists.
    fn path_between(&self, from: RoleId, to: RoleId) -> Option<Vec<RoleId>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut predecessor: BTreeMap<RoleId, RoleId> = BTreeMap::new();
        let mut visited = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            let Some(children) = self.children.get(&current) else {
                continue;
            };

            for child in children.keys() {
                if !visited.insert(*child) {
                    continue;
                }
                predecessor.insert(*child, current);
                if *child == to {
                    let mut path = vec![to];
                    let mut step = to;
                    while let Some(previous) = predecessor.get(&step) {
                        path.push(*previous);
                        step = *previous;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(*child);
            }
        }

        None
    }

    /// Produces the forest view for display purposes.
    ///
    /// Roots are roles never appearing as a child. Never consulted by
    /// resolution.
    #[must_use]
    pub fn tree(&self) -> Vec<RoleTreeNode> {
        let mut child_roles: BTreeSet<RoleId> = BTreeSet::new();
        for children in self.children.values() {
            child_roles.extend(children.keys().copied());
        }

        self.children
            .keys()
            .filter(|parent| !child_roles.contains(parent))
            .map(|root| {
                let mut visited = BTreeSet::from([*root]);
                self.subtree(*root, &mut visited)
            })
            .collect()
    }

    fn subtree(&self, role: RoleId, visited: &mut BTreeSet<RoleId>) -> RoleTreeNode {
        let children = self
            .children
            .get(&role)
            .map(|children| {
                children
                    .keys()
                    .filter(|child| visited.insert(**child))
                    .copied()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|child| self.subtree(child, visited))
            .collect();

        RoleTreeNode { role, children }
    }
}
