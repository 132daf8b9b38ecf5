//! Dependency graph construction and traversal.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::version::{SemanticVersion, VersionConstraint};

/// A package in the dependency graph.
#[derive(Debug, Clone)]
pub struct PackageNode {
    pub name: String,
    /// Declared dependencies in insertion order.
    pub dependencies: Vec<(String, VersionConstraint)>,
    /// Packages that depend on this one. Used for diagnostics only.
    pub dependents: BTreeSet<String>,
    /// Version selected by the resolver, once known.
    pub version: Option<SemanticVersion>,
}

impl PackageNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dependencies: Vec::new(),
            dependents: BTreeSet::new(),
            version: None,
        }
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{} v{v}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// A directed graph of package names backed by petgraph. Edges point from a
/// dependent to its dependency and carry the constraint that was declared.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PackageNode, VersionConstraint>,
    /// Name to node index; a `BTreeMap` so traversals start in name order.
    index: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if absent. Returns the existing index otherwise.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(PackageNode::new(name));
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Add a dependency edge `from -> to`, creating either node as needed.
    pub fn add_edge(&mut self, from: &str, to: &str, constraint: VersionConstraint) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph[from_idx]
            .dependencies
            .push((to.to_string(), constraint.clone()));
        self.graph[to_idx].dependents.insert(from.to_string());
        self.graph.add_edge(from_idx, to_idx, constraint);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&PackageNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Record the version chosen for a package.
    pub fn set_version(&mut self, name: &str, version: SemanticVersion) {
        if let Some(&idx) = self.index.get(name) {
            self.graph[idx].version = Some(version);
        }
    }

    /// Node names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Direct dependencies of a package, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> &[(String, VersionConstraint)] {
        self.node(name)
            .map(|n| n.dependencies.as_slice())
            .unwrap_or_default()
    }

    /// Reverse dependencies (who depends on this package).
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.node(name)
            .map(|n| n.dependents.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outgoing neighbours in edge insertion order. petgraph iterates edges
    /// newest-first, so sort by edge index to keep traversals deterministic.
    fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Find a dependency cycle.
    ///
    /// Returns the full path with the first package repeated at the end
    /// (`a -> b -> c -> a`), or `None` for an acyclic graph.
    pub fn detect_cycles(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();
        let mut stack: Vec<NodeIndex> = Vec::new();
        for &idx in self.index.values() {
            if marks.contains_key(&idx) {
                continue;
            }
            if let Some(cycle) = self.cycle_from(idx, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    fn cycle_from(
        &self,
        idx: NodeIndex,
        marks: &mut HashMap<NodeIndex, Mark>,
        stack: &mut Vec<NodeIndex>,
    ) -> Option<Vec<String>> {
        marks.insert(idx, Mark::OnStack);
        stack.push(idx);

        for child in self.children(idx) {
            match marks.get(&child).copied() {
                Some(Mark::OnStack) => {
                    let start = stack.iter().position(|&n| n == child).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|&n| self.graph[n].name.clone())
                        .collect();
                    cycle.push(self.graph[child].name.clone());
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(cycle) = self.cycle_from(child, marks, stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        stack.pop();
        marks.insert(idx, Mark::Done);
        None
    }

    /// Dependency-first ordering: for every edge `from -> to`, `to` comes
    /// before `from`.
    ///
    /// Only meaningful on an acyclic graph; on a cyclic one the visited guard
    /// still guarantees termination but the order is unspecified.
    pub fn topological_sort(&self) -> Vec<String> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut order = Vec::with_capacity(self.len());
        for &idx in self.index.values() {
            self.postorder(idx, &mut visited, &mut order);
        }
        order
    }

    fn postorder(&self, idx: NodeIndex, visited: &mut HashSet<NodeIndex>, order: &mut Vec<String>) {
        if !visited.insert(idx) {
            return;
        }
        for child in self.children(idx) {
            self.postorder(child, visited, order);
        }
        order.push(self.graph[idx].name.clone());
    }

    /// Find a dependency path from `from` to `to`, both inclusive.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&PackageNode>> {
        let start = *self.index.get(from)?;
        let target = *self.index.get(to)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(start, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.children(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Print the dependency tree below `root`.
    pub fn print_tree(&self, root: &str, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let Some(&root_idx) = self.index.get(root) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[root_idx]));

        let mut visited = HashSet::new();
        visited.insert(root_idx);
        let children = self.unique_children(root_idx);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.print_subtree(&mut output, child, "", i == count - 1, 1, max_depth, &mut visited);
        }
        output
    }

    /// Children with parallel edges (the same dependency declared twice) collapsed.
    fn unique_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.children(idx)
            .into_iter()
            .filter(|c| seen.insert(*c))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let children = self.unique_children(idx);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.print_subtree(
                output,
                child,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Print who depends on `name`, transitively, as an inverted tree.
    pub fn print_inverted_tree(&self, name: &str) -> String {
        let mut output = String::new();
        let Some(&idx) = self.index.get(name) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::new();
        visited.insert(idx);
        let parents = self.parents(idx);
        let count = parents.len();
        for (i, parent) in parents.into_iter().enumerate() {
            self.print_inverted_subtree(&mut output, parent, "", i == count - 1, &mut visited);
        }
        output
    }

    fn parents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph[idx]
            .dependents
            .iter()
            .filter_map(|name| self.index.get(name).copied())
            .collect()
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let parents = self.parents(idx);
        let count = parents.len();
        for (i, parent) in parents.into_iter().enumerate() {
            self.print_inverted_subtree(output, parent, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any() -> VersionConstraint {
        VersionConstraint::parse(">=0.0.0").unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (from, to) in edges {
            g.add_edge(from, to, any());
        }
        g
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut g = DependencyGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("a");
        assert_eq!(a, b);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn add_edge_creates_nodes_and_records_dependents() {
        let mut g = DependencyGraph::new();
        g.add_edge("app", "foo", VersionConstraint::parse("^1.0.0").unwrap());
        assert!(g.contains("app"));
        assert!(g.contains("foo"));
        assert_eq!(g.dependencies_of("app").len(), 1);
        assert_eq!(g.dependencies_of("app")[0].0, "foo");
        assert_eq!(g.dependents_of("foo"), vec!["app"]);
        assert!(g.dependencies_of("foo").is_empty());
    }

    #[test]
    fn dependencies_keep_declaration_order() {
        let g = graph(&[("app", "zeta"), ("app", "alpha"), ("app", "mid")]);
        let names: Vec<&str> = g
            .dependencies_of("app")
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn detects_three_node_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycle = g.detect_cycles().unwrap();
        assert_eq!(cycle, ["a", "b", "c", "a"]);
    }

    #[test]
    fn detects_self_loop() {
        let g = graph(&[("a", "a")]);
        assert_eq!(g.detect_cycles().unwrap(), ["a", "a"]);
    }

    #[test]
    fn cycle_path_excludes_unrelated_prefix() {
        let g = graph(&[("app", "b"), ("b", "c"), ("c", "b")]);
        assert_eq!(g.detect_cycles().unwrap(), ["b", "c", "b"]);
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        assert!(g.detect_cycles().is_none());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(g.detect_cycles().is_none());
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let edges = [
            ("app", "web"),
            ("app", "db"),
            ("web", "http"),
            ("http", "bytes"),
            ("db", "bytes"),
            ("db", "log"),
            ("web", "log"),
        ];
        let g = graph(&edges);
        let order = g.topological_sort();
        assert_eq!(order.len(), g.len());
        for (from, to) in edges {
            assert!(
                position(&order, to) < position(&order, from),
                "{to} must precede {from} in {order:?}"
            );
        }
    }

    #[test]
    fn topological_order_is_deterministic() {
        let a = graph(&[("x", "y"), ("a", "b"), ("m", "n")]).topological_sort();
        let b = graph(&[("m", "n"), ("x", "y"), ("a", "b")]).topological_sort();
        assert_eq!(a, b);
        assert_eq!(a, ["b", "a", "n", "m", "y", "x"]);
    }

    #[test]
    fn topological_sort_terminates_on_cycle() {
        let g = graph(&[("a", "b"), ("b", "a")]);
        assert_eq!(g.topological_sort().len(), 2);
    }

    #[test]
    fn find_path_exists() {
        let g = graph(&[("app", "a"), ("a", "b"), ("app", "c")]);
        let path: Vec<&str> = g
            .find_path("app", "b")
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(path, ["app", "a", "b"]);
    }

    #[test]
    fn find_path_not_found() {
        let g = graph(&[("app", "a"), ("b", "c")]);
        assert!(g.find_path("app", "c").is_none());
        assert!(g.find_path("app", "missing").is_none());
    }

    #[test]
    fn tree_printing_shows_versions() {
        let mut g = graph(&[("app", "a"), ("app", "b"), ("a", "c")]);
        g.set_version("a", SemanticVersion::new(1, 0, 0));
        g.set_version("b", SemanticVersion::new(2, 0, 0));
        g.set_version("c", SemanticVersion::new(3, 0, 0));

        let tree = g.print_tree("app", None);
        assert_eq!(
            tree,
            "app\n├── a v1.0.0\n│   └── c v3.0.0\n└── b v2.0.0\n"
        );
    }

    #[test]
    fn tree_printing_respects_depth() {
        let g = graph(&[("app", "a"), ("a", "b"), ("b", "c")]);
        let tree = g.print_tree("app", Some(1));
        assert!(tree.contains("a"));
        assert!(!tree.contains("b"));
    }

    #[test]
    fn inverted_tree_walks_dependents() {
        let g = graph(&[("app", "a"), ("a", "b"), ("app", "b")]);
        let inv = g.print_inverted_tree("b");
        assert!(inv.starts_with("b\n"));
        assert!(inv.contains("── a\n"));
        assert!(inv.contains("── app\n"));
    }
}
