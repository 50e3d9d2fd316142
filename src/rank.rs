//! Module flattening the customer-provider hierarchy into ranks.

use crate::bgp::Relation;
use crate::graph::AsGraph;
use crate::Asn;
use log::debug;
use std::collections::HashMap;

/// Assignment of every AS to a level of the provider hierarchy. Rank 0 holds
/// the ASes without customers; every other rank holds the ASes whose
/// customers all sit at strictly lower ranks.
#[derive(Debug, Default)]
pub struct RankIndex {
    rank_of: HashMap<Asn, usize>,
    groups: Vec<Vec<Asn>>,
}

impl RankIndex {
    /// Kahn-style level-wave ordering over the customer-to-provider edges.
    /// Every wave drains the ASes whose remaining customer count reached
    /// zero, assigns them the current rank, and credits their providers.
    /// ASes on a customer-provider cycle never drain and stay unranked;
    /// callers must run the cycle check first.
    pub fn flatten(graph: &AsGraph) -> Self {
        debug!("Flattening graph with {} ASNs...", graph.num_asns());

        let mut customer_count: HashMap<Asn, usize> = graph
            .asns()
            .map(|asn| (asn, graph.customer_count(asn)))
            .collect();

        let mut rank_of = HashMap::new();
        let mut groups: Vec<Vec<Asn>> = Vec::new();
        let mut wave: Vec<Asn> = graph.asns().filter(|asn| customer_count[asn] == 0).collect();

        while !wave.is_empty() {
            let rank = groups.len();
            let mut next = Vec::new();
            for &asn in &wave {
                rank_of.insert(asn, rank);
                for (provider, rel) in graph.neighbors(asn) {
                    if rel != Relation::CustomerToProvider {
                        continue;
                    }
                    if let Some(count) = customer_count.get_mut(&provider) {
                        *count -= 1;
                        if *count == 0 {
                            next.push(provider);
                        }
                    }
                }
            }
            groups.push(wave);
            wave = next;
        }

        debug!(
            "Found {} rank-0 ASNs",
            groups.first().map(|group| group.len()).unwrap_or(0)
        );
        debug!("Graph flattened into {} ranks", groups.len());
        for (rank, group) in groups.iter().enumerate() {
            debug!("  Rank {}: {} ASNs", rank, group.len());
        }

        Self { rank_of, groups }
    }

    /// Rank of an AS, `None` if the flattening never drained it
    pub fn rank_of(&self, asn: Asn) -> Option<usize> {
        self.rank_of.get(&asn).copied()
    }

    /// Number of ranks
    pub fn num_ranks(&self) -> usize {
        self.groups.len()
    }

    /// The rank groups, bottom of the hierarchy first. Within a group, ASes
    /// appear in the order the flattening drained them.
    pub fn groups(&self) -> &[Vec<Asn>] {
        &self.groups
    }
}
