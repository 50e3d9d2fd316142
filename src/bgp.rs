//! Module containing definitions for BGP routes and the Gao-Rexford export
//! policy.

use crate::{Asn, Prefix};

/// Commercial relationship of an AS towards one of its neighbors. Every
/// relationship in the topology is stored twice, once per direction, with the
/// two directions carrying mirrored relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// self is the provider of the neighbor
    ProviderToCustomer,
    /// self is the customer of the neighbor
    CustomerToProvider,
    /// self and the neighbor are peers
    PeerToPeer,
}

impl Relation {
    /// The relation the neighbor holds back towards self.
    pub fn inverse(&self) -> Self {
        match self {
            Self::ProviderToCustomer => Self::CustomerToProvider,
            Self::CustomerToProvider => Self::ProviderToCustomer,
            Self::PeerToPeer => Self::PeerToPeer,
        }
    }

    /// How the receiving end of an edge with this relation classifies a route
    /// sent over it. A route sent customer-to-provider is a customer route
    /// for the provider receiving it.
    pub fn received_as(&self) -> LearnedFrom {
        match self {
            Self::CustomerToProvider => LearnedFrom::Customer,
            Self::PeerToPeer => LearnedFrom::Peer,
            Self::ProviderToCustomer => LearnedFrom::Provider,
        }
    }
}

/// The receiver's view of how it learned a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearnedFrom {
    /// learned from a customer (or originated locally)
    Customer,
    /// learned from a peer
    Peer,
    /// learned from a provider
    Provider,
}

impl LearnedFrom {
    /// Local preference: customer routes beat peer routes beat provider
    /// routes.
    pub fn local_pref(&self) -> u8 {
        match self {
            Self::Customer => 2,
            Self::Peer => 1,
            Self::Provider => 0,
        }
    }
}

/// A single BGP announcement, as held in a Local-RIB or a message queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// the announced prefix
    pub prefix: Prefix,
    /// traversed ASes, most recent hop first, origin last
    pub as_path: Vec<Asn>,
    /// the receiver's view of how it got the route
    pub learned_from: LearnedFrom,
    /// tagged invalid by Route Origin Validation at seeding time
    pub rov_invalid: bool,
}

impl Route {
    /// The AS that originated the announcement (tail of the path).
    pub fn origin(&self) -> Asn {
        self.as_path[self.as_path.len() - 1]
    }

    /// Next-hop ASN used as the final tie-break: the second path element, or
    /// the only element for a freshly seeded route.
    pub fn next_hop(&self) -> Asn {
        if self.as_path.len() >= 2 {
            self.as_path[1]
        } else {
            self.as_path[0]
        }
    }

    /// Gao-Rexford export rule: a route learned from a customer is exported
    /// everywhere, while routes learned from a peer or a provider only
    /// travel down to customers.
    pub fn may_export(&self, towards: Relation) -> bool {
        match self.learned_from {
            LearnedFrom::Customer => true,
            LearnedFrom::Peer | LearnedFrom::Provider => {
                towards == Relation::ProviderToCustomer
            }
        }
    }

    /// Materialize the copy of this route a neighbor receives over an edge
    /// of the given relation: the receiver is prepended to the path and the
    /// route is reclassified from the receiver's point of view.
    pub fn forwarded(&self, receiver: Asn, over: Relation) -> Route {
        let mut as_path = Vec::with_capacity(self.as_path.len() + 1);
        as_path.push(receiver);
        as_path.extend_from_slice(&self.as_path);
        Route {
            prefix: self.prefix.clone(),
            as_path,
            learned_from: over.received_as(),
            rov_invalid: self.rov_invalid,
        }
    }
}
