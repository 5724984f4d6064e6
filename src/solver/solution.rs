use std::fmt;

use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;

/// A single slot in the node pool: depot (index 0) or a customer visit.
#[derive(Debug, Clone, Copy, Default)]
struct NodeRecord {
    predecessor: NodeId,
    successor: NodeId,
    customer: NodeId,
    load: IntType,
    index_in_used_nodes: usize,
}

/// The solution store: a growable arena of doubly-linked node slots.
/// Index 0 is the permanent depot sentinel; a route is the maximal chain
/// between two depot links. Slots freed by `remove` are reused by `insert`
/// before the arena grows.
#[derive(Debug, Clone)]
pub struct Solution {
    nodes: Vec<NodeRecord>,
    used_nodes: Vec<NodeId>,
    unused_nodes: Vec<NodeId>,
}

impl Solution {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord::default()],
            used_nodes: Vec::new(),
            unused_nodes: Vec::new(),
        }
    }

    pub fn predecessor(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].predecessor
    }

    pub fn successor(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].successor
    }

    pub fn customer(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].customer
    }

    pub fn load(&self, node: NodeId) -> IntType {
        self.nodes[node as usize].load
    }

    pub fn set_predecessor(&mut self, node: NodeId, predecessor: NodeId) {
        self.nodes[node as usize].predecessor = predecessor;
    }

    pub fn set_successor(&mut self, node: NodeId, successor: NodeId) {
        self.nodes[node as usize].successor = successor;
    }

    pub fn set_customer(&mut self, node: NodeId, customer: NodeId) {
        self.nodes[node as usize].customer = customer;
    }

    pub fn set_load(&mut self, node: NodeId, load: IntType) {
        self.nodes[node as usize].load = load;
    }

    /// Links `predecessor -> successor` as adjacent in both directions.
    pub fn link(&mut self, predecessor: NodeId, successor: NodeId) {
        self.set_successor(predecessor, successor);
        self.set_predecessor(successor, predecessor);
    }

    /// Physically reverses the segment `[left, right]` (inclusive, walked
    /// via predecessor links from `right` back to `left`) and splices it in
    /// between `predecessor` and `successor`.
    pub fn reversed_link(&mut self, left: NodeId, right: NodeId, predecessor: NodeId, successor: NodeId) {
        let mut node = right;
        let mut chain_predecessor = predecessor;
        while node != left {
            let next = self.predecessor(node);
            self.link(chain_predecessor, node);
            chain_predecessor = node;
            node = next;
        }
        self.link(chain_predecessor, left);
        self.link(left, successor);
    }

    fn new_node(&mut self, customer: NodeId, load: IntType) -> NodeId {
        let node = if let Some(reused) = self.unused_nodes.pop() {
            reused
        } else {
            let id = self.nodes.len() as NodeId;
            self.nodes.push(NodeRecord::default());
            id
        };
        let record = &mut self.nodes[node as usize];
        record.customer = customer;
        record.load = load;
        record.index_in_used_nodes = self.used_nodes.len();
        self.used_nodes.push(node);
        node
    }

    /// Inserts a new node carrying `customer`/`load` between `predecessor`
    /// and `successor`, returning the new node's id.
    pub fn insert(
        &mut self,
        customer: NodeId,
        load: IntType,
        predecessor: NodeId,
        successor: NodeId,
    ) -> NodeId {
        let node = self.new_node(customer, load);
        self.link(predecessor, node);
        self.link(node, successor);
        node
    }

    /// Splices `node` out of its chain and frees its slot for reuse.
    pub fn remove(&mut self, node: NodeId) {
        let predecessor = self.predecessor(node);
        let successor = self.successor(node);
        self.link(predecessor, successor);

        let index = self.nodes[node as usize].index_in_used_nodes;
        let last = *self.used_nodes.last().expect("remove on empty used set");
        self.used_nodes.swap_remove(index);
        if last != node {
            self.nodes[last as usize].index_in_used_nodes = index;
        }
        self.unused_nodes.push(node);
    }

    /// Live node ids (excludes the depot and freed slots).
    pub fn node_indices(&self) -> &[NodeId] {
        &self.used_nodes
    }

    pub fn max_node_index(&self) -> NodeId {
        (self.nodes.len() - 1) as NodeId
    }

    /// Recomputes the total route distance from scratch: every node
    /// contributes the edge to its predecessor, and route tails
    /// additionally contribute the closing edge back to the depot.
    pub fn calc_objective(&self, problem: &Problem) -> IntType {
        let mut total = 0;
        for &node in &self.used_nodes {
            let predecessor = self.predecessor(node);
            total += problem.distance(self.customer(node), self.customer(predecessor));
            if self.successor(node) == DEPOT {
                total += problem.distance(self.customer(node), 0);
            }
        }
        total
    }

    /// All current route heads (nodes whose predecessor is the depot).
    pub fn route_heads(&self) -> Vec<NodeId> {
        self.used_nodes
            .iter()
            .copied()
            .filter(|&node| self.predecessor(node) == DEPOT)
            .collect()
    }

    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for head in self.route_heads() {
            write!(f, "Route {head}: 0")?;
            let mut node = head;
            loop {
                write!(f, " - {} ({})", self.customer(node), self.load(node))?;
                let next = self.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
            writeln!(f, " - 0")?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> String {
        let mut out = String::from("[");
        let heads = self.route_heads();
        for (i, head) in heads.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('[');
            out.push_str("{\"customer\":0,\"quantity\":0},");
            let mut node = *head;
            loop {
                out.push_str(&format!(
                    "{{\"customer\":{},\"quantity\":{}}},",
                    self.customer(node),
                    self.load(node)
                ));
                let next = self.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
            out.push_str("{\"customer\":0,\"quantity\":0}");
            out.push(']');
        }
        out.push(']');
        out
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove_maintain_links() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 5, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        solution.link(a, DEPOT);
        let b = solution.insert(2, 3, a, DEPOT);
        solution.link(a, b);
        solution.link(b, DEPOT);

        assert_eq!(solution.successor(a), b);
        assert_eq!(solution.predecessor(b), a);

        solution.remove(a);
        assert_eq!(solution.predecessor(b), DEPOT);
        assert_eq!(solution.node_indices().len(), 1);
    }

    #[test]
    fn reused_slot_keeps_used_nodes_consistent() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 1, DEPOT, DEPOT);
        let b = solution.insert(2, 1, a, DEPOT);
        solution.remove(a);
        let c = solution.insert(3, 1, DEPOT, b);
        assert_eq!(c, a);
        assert_eq!(solution.node_indices().len(), 2);
    }

    #[test]
    fn route_text_format_matches_expected_shape() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 5, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        solution.link(a, DEPOT);
        let text = format!("{solution}");
        assert_eq!(text, format!("Route {a}: 0 - 1 (5) - 0\n"));
    }
}
