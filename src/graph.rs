//! Module defining the AS-level topology with typed commercial
//! relationships.

use crate::bgp::Relation;
use crate::Asn;
use log::info;
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use std::collections::HashMap;

type IndexType = u32;
/// Node handle into the AS topology
pub type AsNode = NodeIndex<IndexType>;
/// AS topology graph. Nodes carry the AS number, directed edges carry the
/// relation of the source towards the target.
pub type Topology = StableGraph<Asn, Relation, Directed, IndexType>;

/// AS graph with typed adjacency. Adding a relationship inserts the forward
/// and the mirrored reverse edge at once, so `neighbors` always reflects both
/// endpoints. Duplicate relationships in the input yield parallel edges.
#[derive(Debug, Default)]
pub struct AsGraph {
    graph: Topology,
    nodes: HashMap<Asn, AsNode>,
}

impl AsGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct ASes
    pub fn num_asns(&self) -> usize {
        self.graph.node_count()
    }

    /// Look up the AS, inserting it without any relationship if it is new.
    /// Announcements may be seeded at ASes that never appear in the
    /// relationship file; those become isolated nodes.
    pub fn ensure_asn(&mut self, asn: Asn) -> AsNode {
        match self.nodes.get(&asn) {
            Some(node) => *node,
            None => {
                let node = self.graph.add_node(asn);
                self.nodes.insert(asn, node);
                node
            }
        }
    }

    /// Insert the relationship `a -> b` together with its mirror image
    /// `b -> a`.
    pub fn add_relationship(&mut self, a: Asn, b: Asn, rel: Relation) {
        let na = self.ensure_asn(a);
        let nb = self.ensure_asn(b);
        self.graph.add_edge(na, nb, rel);
        self.graph.add_edge(nb, na, rel.inverse());
    }

    /// All ASes, in the order they were first seen
    pub fn asns(&self) -> impl Iterator<Item = Asn> + '_ {
        self.graph.node_indices().map(move |node| self.graph[node])
    }

    /// Typed neighbors of an AS; empty if the AS is unknown
    pub fn neighbors(&self, asn: Asn) -> impl Iterator<Item = (Asn, Relation)> + '_ {
        self.nodes.get(&asn).into_iter().flat_map(move |&node| {
            self.graph
                .edges(node)
                .map(move |e| (self.graph[e.target()], *e.weight()))
        })
    }

    /// Number of customers of an AS (outgoing provider-to-customer edges)
    pub fn customer_count(&self, asn: Asn) -> usize {
        self.neighbors(asn)
            .filter(|(_, rel)| *rel == Relation::ProviderToCustomer)
            .count()
    }

    /// Check the customer-provider hierarchy for a directed cycle, following
    /// only customer-to-provider edges. Three-coloring traversal with an
    /// explicit stack, so deep provider chains cannot exhaust the call
    /// stack. Restarts from every unvisited AS.
    pub fn has_customer_provider_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: HashMap<AsNode, Color> = self
            .graph
            .node_indices()
            .map(|node| (node, Color::White))
            .collect();
        let mut stack: Vec<(AsNode, bool)> = Vec::new();

        for start in self.graph.node_indices() {
            if color[&start] != Color::White {
                continue;
            }
            stack.push((start, false));
            while let Some((node, expanded)) = stack.pop() {
                if expanded {
                    color.insert(node, Color::Black);
                    continue;
                }
                if color[&node] == Color::Black {
                    // reached through a second parent in the meantime
                    continue;
                }
                color.insert(node, Color::Gray);
                stack.push((node, true));
                for edge in self.graph.edges(node) {
                    if *edge.weight() != Relation::CustomerToProvider {
                        continue;
                    }
                    match color[&edge.target()] {
                        // gray-on-gray back edge
                        Color::Gray => return true,
                        Color::White => stack.push((edge.target(), false)),
                        Color::Black => {}
                    }
                }
            }
        }
        false
    }

    /// Log the size of the graph and the per-relation edge tallies
    pub fn log_stats(&self) {
        let mut customers = 0;
        let mut peers = 0;
        let mut providers = 0;
        for node in self.graph.node_indices() {
            for edge in self.graph.edges(node) {
                match edge.weight() {
                    Relation::CustomerToProvider => customers += 1,
                    Relation::PeerToPeer => peers += 1,
                    Relation::ProviderToCustomer => providers += 1,
                }
            }
        }
        info!(
            "Graph stats - ASNs: {}, Customer rels: {}, Peer rels: {}, Provider rels: {}",
            self.num_asns(),
            customers,
            peers,
            providers
        );
    }
}
