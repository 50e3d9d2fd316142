//! Module driving the rank-ordered three-phase route propagation.

use crate::bgp::{LearnedFrom, Relation, Route};
use crate::graph::AsGraph;
use crate::rank::RankIndex;
use crate::{Asn, Prefix, SimError};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Hard cap on propagation iterations before the run is declared
/// non-converging.
const MAX_ITERATIONS: usize = 20;

/// Per-AS best route per prefix
type Rib = HashMap<Prefix, Route>;
/// Routes received by an AS and not yet ingested, per prefix, in arrival
/// order
type Inbox = HashMap<Prefix, Vec<Route>>;

/// BGP propagation engine over an AS relationship graph.
///
/// The engine owns all routing state: one Local-RIB and one message inbox per
/// AS. A run seeds the origin announcements, flattens the graph into ranks,
/// and iterates the three Gao-Rexford phases (customer-up, peer-across,
/// provider-down) until the total number of RIB entries is stable for one
/// full iteration.
#[derive(Debug)]
pub struct Simulator {
    graph: AsGraph,
    rov_enabled: HashSet<Asn>,
    ribs: HashMap<Asn, Rib>,
    inboxes: HashMap<Asn, Inbox>,
}

impl Simulator {
    /// Create a simulator over the given topology
    pub fn new(graph: AsGraph) -> Self {
        Self {
            graph,
            rov_enabled: HashSet::new(),
            ribs: HashMap::new(),
            inboxes: HashMap::new(),
        }
    }

    /// Mark the given ASes as enforcing Route Origin Validation. They drop
    /// incoming `rov_invalid` routes on ingress.
    pub fn set_rov_asns(&mut self, asns: HashSet<Asn>) {
        self.rov_enabled = asns;
    }

    /// Install the origin announcement of `prefix` at `origin`. The seeded
    /// route is classified as a customer route so that it propagates freely
    /// upward, across, and downward. Seeding the same announcement twice
    /// leaves a single RIB entry. An origin unknown to the relationship file
    /// is inserted into the graph as an isolated AS.
    pub fn seed_announcement(&mut self, origin: Asn, prefix: Prefix, rov_invalid: bool) {
        self.graph.ensure_asn(origin);
        let route = Route {
            prefix: prefix.clone(),
            as_path: vec![origin],
            learned_from: LearnedFrom::Customer,
            rov_invalid,
        };
        debug!(
            "Seeded: AS {} -> {}{}",
            origin,
            prefix,
            if rov_invalid { " (ROV invalid)" } else { "" }
        );
        self.ribs.entry(origin).or_default().insert(prefix, route);
    }

    /// Run the propagation until the total RIB entry count is stable across
    /// one full iteration. Fails if the graph has a customer-provider cycle
    /// (checked before any route is exchanged) or if the iteration cap is
    /// reached.
    pub fn propagate(&mut self) -> Result<(), SimError> {
        if self.graph.has_customer_provider_cycle() {
            return Err(SimError::CustomerProviderCycle);
        }

        info!("Starting BGP propagation...");
        let ranks = RankIndex::flatten(&self.graph);

        let mut prev_total = 0;
        for iteration in 1..=MAX_ITERATIONS {
            debug!("Iteration {}:", iteration);
            self.phase_up(&ranks);
            self.phase_peer(&ranks);
            self.phase_down(&ranks);

            let total = self.rib_count();
            debug!("  Total routes: {}", total);
            if total == prev_total {
                info!("BGP converged after {} iterations", iteration);
                return Ok(());
            }
            prev_total = total;
        }
        Err(SimError::NoConvergence(MAX_ITERATIONS))
    }

    /// Total number of (AS, prefix) RIB entries
    pub fn rib_count(&self) -> usize {
        self.ribs.values().map(|rib| rib.len()).sum()
    }

    /// All RIB entries as (owning AS, chosen route) pairs, unordered
    pub fn rib_entries(&self) -> impl Iterator<Item = (Asn, &Route)> {
        self.ribs
            .iter()
            .flat_map(|(asn, rib)| rib.values().map(move |route| (*asn, route)))
    }

    /// The chosen route at `asn` for `prefix`, if any
    pub fn route(&self, asn: Asn, prefix: &Prefix) -> Option<&Route> {
        self.ribs.get(&asn).and_then(|rib| rib.get(prefix))
    }

    /// Read access to the underlying topology
    pub fn graph(&self) -> &AsGraph {
        &self.graph
    }

    // -----------------
    // Private Functions
    // -----------------

    /// Phase 1 (UP): every rank sends along customer-to-provider edges, then
    /// the rank above ingests. Providers thereby see the advertisements of
    /// all their customers within a single pass.
    fn phase_up(&mut self, ranks: &RankIndex) {
        debug!("  Phase 1: Propagating to providers...");
        let num_ranks = ranks.num_ranks();
        for rank in 0..num_ranks {
            self.send_from_rank(ranks, rank, Relation::CustomerToProvider);
            if rank + 1 < num_ranks {
                self.process_rank(ranks, rank + 1);
            }
        }
    }

    /// Phase 2 (PEER): every rank sends along peer edges and ingests at the
    /// same level. Cross-rank peerings settle in later phases or iterations.
    fn phase_peer(&mut self, ranks: &RankIndex) {
        debug!("  Phase 2: Propagating to peers...");
        for rank in 0..ranks.num_ranks() {
            self.send_from_rank(ranks, rank, Relation::PeerToPeer);
            self.process_rank(ranks, rank);
        }
    }

    /// Phase 3 (DOWN): from the top of the hierarchy, every rank sends along
    /// provider-to-customer edges, then the rank below ingests. Rank 0 has
    /// no customers and sends nothing.
    fn phase_down(&mut self, ranks: &RankIndex) {
        debug!("  Phase 3: Propagating to customers...");
        for rank in (1..ranks.num_ranks()).rev() {
            self.send_from_rank(ranks, rank, Relation::ProviderToCustomer);
            self.process_rank(ranks, rank - 1);
        }
    }

    /// Send every RIB entry of every AS at `rank` over all of its edges of
    /// the given relation.
    fn send_from_rank(&mut self, ranks: &RankIndex, rank: usize, over: Relation) {
        for &asn in &ranks.groups()[rank] {
            let rib = match self.ribs.get(&asn) {
                Some(rib) => rib,
                None => continue,
            };
            for route in rib.values() {
                for (neighbor, rel) in self.graph.neighbors(asn) {
                    if rel == over {
                        Self::send_route(&mut self.inboxes, neighbor, route, rel);
                    }
                }
            }
        }
    }

    /// Enqueue a copy of `route` at `receiver`, unless the receiver is
    /// already on the path or the export policy forbids the edge.
    fn send_route(inboxes: &mut HashMap<Asn, Inbox>, receiver: Asn, route: &Route, over: Relation) {
        if route.as_path.contains(&receiver) {
            return;
        }
        if !route.may_export(over) {
            return;
        }
        let sent = route.forwarded(receiver, over);
        inboxes
            .entry(receiver)
            .or_default()
            .entry(sent.prefix.clone())
            .or_default()
            .push(sent);
    }

    /// Let every AS at `rank` ingest its queued routes
    fn process_rank(&mut self, ranks: &RankIndex, rank: usize) {
        for &asn in &ranks.groups()[rank] {
            self.process_messages(asn);
        }
    }

    /// Ingest every queued route at `asn`: ROV-enabled ASes drop invalid
    /// routes outright, everything else runs through the decision process
    /// against the installed route. The inbox is cleared afterwards.
    fn process_messages(&mut self, asn: Asn) {
        let inbox = match self.inboxes.get_mut(&asn) {
            Some(inbox) => std::mem::take(inbox),
            None => return,
        };
        let rov_enabled = self.rov_enabled.contains(&asn);
        for (prefix, routes) in inbox {
            for route in routes {
                if rov_enabled && route.rov_invalid {
                    continue;
                }
                let install = match self.ribs.get(&asn).and_then(|rib| rib.get(&prefix)) {
                    Some(current) => self.better_route(&route, current, asn),
                    None => true,
                };
                if install {
                    self.ribs
                        .entry(asn)
                        .or_default()
                        .insert(prefix.clone(), route);
                }
            }
        }
    }

    /// Decide whether `candidate` must replace `current` at the deciding AS.
    /// Every criterion is strict; the incumbent survives a full tie.
    fn better_route(&self, candidate: &Route, current: &Route, deciding: Asn) -> bool {
        // ROV-aware ASes prefer the valid route whenever the two disagree.
        // Ingress drop keeps invalid routes out of their RIBs already; this
        // clause stays in place for a mark-but-don't-drop validation mode.
        if self.rov_enabled.contains(&deciding) && candidate.rov_invalid != current.rov_invalid {
            return !candidate.rov_invalid;
        }

        let candidate_pref = candidate.learned_from.local_pref();
        let current_pref = current.learned_from.local_pref();
        if candidate_pref != current_pref {
            return candidate_pref > current_pref;
        }

        if candidate.as_path.len() != current.as_path.len() {
            return candidate.as_path.len() < current.as_path.len();
        }

        candidate.next_hop() < current.next_hop()
    }
}
