//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that collaborator adapters must implement:
//! - AggregateReader / AggregateWriter: persisted aggregate storage
//! - SocialGraph: current social signals of a viewer
//! - ScopeResolver: maps scope ids to aggregate readers
//! - SnapshotSealer: seals and opens stored aggregates
//!
//! These traits keep the engine free of network I/O, signing and persistence.

pub mod aggregate_store;
pub mod null_social_graph;
pub mod scope_resolver;
pub mod snapshot_sealer;
pub mod social_graph;

pub use aggregate_store::{AggregateReader, AggregateWriter};
pub use null_social_graph::NullSocialGraph;
pub use scope_resolver::ScopeResolver;
pub use snapshot_sealer::SnapshotSealer;
pub use social_graph::SocialGraph;
