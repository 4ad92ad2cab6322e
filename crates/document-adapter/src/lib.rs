//! Document tree capability consumed by the pattern perceiver.
//!
//! The observer never owns the document it inspects. Everything it needs is
//! expressed through [`DocumentTree`] (ordered reads plus a single style write)
//! and [`MutationSource`] (child-list change notifications under a subtree).
//! [`InMemoryDocument`] is the arena-backed implementation used by the CLI and
//! the test suites.

pub mod error;
pub mod fixture;
pub mod memory;
pub mod ports;

pub use error::{AdapterError, AdapterErrorKind};
pub use fixture::DocumentFixture;
pub use memory::InMemoryDocument;
pub use ports::{DocumentTree, MutationNotice, MutationSource, MutationSubscription};
pub use sweeper_core_types::NodeId;
