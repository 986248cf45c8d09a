use crate::error::{DagForgeError, DfResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use strum_macros::{Display, EnumIter, EnumString};

/// Distribution family attached to a node's conditional distribution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    LinearGaussian,
    Kde,
}

/// Arc constraints resolved to node indices.
pub type ArcSet = HashSet<(usize, usize)>;

/// Directed acyclic graph over named nodes, each tagged with a [`NodeKind`].
///
/// Parent/child sets are `BTreeSet` so iteration order (and therefore
/// candidate scan order in the operator sets) is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DagData")]
pub struct Dag {
    names: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    parents: Vec<BTreeSet<usize>>,
    children: Vec<BTreeSet<usize>>,
    kinds: Vec<NodeKind>,
}

/// Serialized form of [`Dag`]; conversion rebuilds the name index so a
/// deserialized graph resolves node names without further setup.
#[derive(Deserialize)]
struct DagData {
    names: Vec<String>,
    parents: Vec<BTreeSet<usize>>,
    children: Vec<BTreeSet<usize>>,
    kinds: Vec<NodeKind>,
}

impl From<DagData> for Dag {
    fn from(raw: DagData) -> Self {
        let index = raw
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            names: raw.names,
            index,
            parents: raw.parents,
            children: raw.children,
            kinds: raw.kinds,
        }
    }
}

impl Dag {
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let n = names.len();
        Self {
            names,
            index,
            parents: vec![BTreeSet::new(); n],
            children: vec![BTreeSet::new(); n],
            kinds: vec![NodeKind::LinearGaussian; n],
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.names.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.children.iter().map(|c| c.len()).sum()
    }

    #[inline]
    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn node_kind(&self, node: usize) -> NodeKind {
        self.kinds[node]
    }

    pub fn set_node_kind(&mut self, node: usize, kind: NodeKind) {
        self.kinds[node] = kind;
    }

    #[inline]
    pub fn parents(&self, node: usize) -> &BTreeSet<usize> {
        &self.parents[node]
    }

    #[inline]
    pub fn children(&self, node: usize) -> &BTreeSet<usize> {
        &self.children[node]
    }

    #[inline]
    pub fn in_degree(&self, node: usize) -> usize {
        self.parents[node].len()
    }

    #[inline]
    pub fn has_arc(&self, source: usize, target: usize) -> bool {
        self.children[source].contains(&target)
    }

    /// All arcs as (source, target) pairs, in deterministic order.
    pub fn arcs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.num_arcs());
        for (s, ch) in self.children.iter().enumerate() {
            for &t in ch {
                out.push((s, t));
            }
        }
        out
    }

    /// Directed path check via DFS.
    pub fn has_path(&self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.num_nodes()];
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if visited[node] {
                continue;
            }
            visited[node] = true;
            stack.extend(self.children[node].iter().copied());
        }
        false
    }

    /// True if adding source -> target would close a directed cycle.
    pub fn would_close_cycle(&self, source: usize, target: usize) -> bool {
        self.has_path(target, source)
    }

    /// True if reversing an existing source -> target arc would close a cycle.
    /// A path target ~> source through any other node makes the flip illegal.
    pub fn flip_would_close_cycle(&self, source: usize, target: usize) -> bool {
        let mut visited = vec![false; self.num_nodes()];
        let mut stack: Vec<usize> = self.children[source]
            .iter()
            .copied()
            .filter(|&c| c != target)
            .collect();
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if visited[node] {
                continue;
            }
            visited[node] = true;
            stack.extend(self.children[node].iter().copied());
        }
        false
    }

    pub fn add_arc(&mut self, source: usize, target: usize) -> DfResult<()> {
        if self.has_arc(source, target) {
            return Err(DagForgeError::Validation(format!(
                "Arc {} -> {} already present",
                self.names[source], self.names[target]
            )));
        }
        if self.would_close_cycle(source, target) {
            return Err(DagForgeError::Constraint(format!(
                "Arc {} -> {} would create a cycle",
                self.names[source], self.names[target]
            )));
        }
        self.children[source].insert(target);
        self.parents[target].insert(source);
        Ok(())
    }

    pub fn remove_arc(&mut self, source: usize, target: usize) -> DfResult<()> {
        if !self.has_arc(source, target) {
            return Err(DagForgeError::Validation(format!(
                "Arc {} -> {} not present",
                self.names[source], self.names[target]
            )));
        }
        self.children[source].remove(&target);
        self.parents[target].remove(&source);
        Ok(())
    }

    pub fn flip_arc(&mut self, source: usize, target: usize) -> DfResult<()> {
        if !self.has_arc(source, target) {
            return Err(DagForgeError::Validation(format!(
                "Arc {} -> {} not present",
                self.names[source], self.names[target]
            )));
        }
        if self.flip_would_close_cycle(source, target) {
            return Err(DagForgeError::Constraint(format!(
                "Flipping {} -> {} would create a cycle",
                self.names[source], self.names[target]
            )));
        }
        self.children[source].remove(&target);
        self.parents[target].remove(&source);
        self.children[target].insert(source);
        self.parents[source].insert(target);
        Ok(())
    }

    /// Adjacency edit without cycle checks, for hypothetical scoring probes.
    /// Callers are responsible for never committing a cyclic structure.
    pub(crate) fn set_arc_unchecked(&mut self, source: usize, target: usize, present: bool) {
        if present {
            self.children[source].insert(target);
            self.parents[target].insert(source);
        } else {
            self.children[source].remove(&target);
            self.parents[target].remove(&source);
        }
    }

    /// Fails fast if any blacklisted arc is already present.
    pub fn check_blacklist(&self, blacklist: &ArcSet) -> DfResult<()> {
        for &(s, t) in blacklist {
            if self.has_arc(s, t) {
                return Err(DagForgeError::Constraint(format!(
                    "Start model contains blacklisted arc {} -> {}",
                    self.names[s], self.names[t]
                )));
            }
        }
        Ok(())
    }

    /// Inserts every whitelisted arc not yet present. The reversed arc, if
    /// present, is flipped so the whitelist direction wins. A whitelist
    /// demanding both directions of the same pair is unsatisfiable.
    pub fn force_whitelist(&mut self, whitelist: &ArcSet) -> DfResult<()> {
        for &(s, t) in whitelist {
            if whitelist.contains(&(t, s)) {
                return Err(DagForgeError::Constraint(format!(
                    "Whitelist requires both {} -> {} and {} -> {}",
                    self.names[s], self.names[t], self.names[t], self.names[s]
                )));
            }
        }
        let mut ordered: Vec<_> = whitelist.iter().copied().collect();
        ordered.sort_unstable();
        for (s, t) in ordered {
            if self.has_arc(s, t) {
                continue;
            }
            if self.has_arc(t, s) {
                self.flip_arc(t, s)?;
            } else {
                self.add_arc(s, t)?;
            }
        }
        Ok(())
    }

    /// Pins whitelisted nodes to their required distribution family.
    pub fn force_kind_whitelist(&mut self, kind_whitelist: &[(usize, NodeKind)]) {
        for &(node, kind) in kind_whitelist {
            self.kinds[node] = kind;
        }
    }

    /// Resolves (source-name, target-name) pairs into an [`ArcSet`].
    pub fn resolve_arcs(&self, pairs: &[(String, String)]) -> DfResult<ArcSet> {
        let mut out = ArcSet::with_capacity(pairs.len());
        for (s, t) in pairs {
            let s_idx = self.node_index(s).ok_or_else(|| {
                DagForgeError::Validation(format!("Unknown node '{}' in arc constraint", s))
            })?;
            let t_idx = self.node_index(t).ok_or_else(|| {
                DagForgeError::Validation(format!("Unknown node '{}' in arc constraint", t))
            })?;
            if s_idx == t_idx {
                return Err(DagForgeError::Validation(format!(
                    "Self-arc constraint on '{}'",
                    s
                )));
            }
            out.insert((s_idx, t_idx));
        }
        Ok(out)
    }
}
