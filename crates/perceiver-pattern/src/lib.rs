//! Pattern perceiver: finds the first stable composite-marker region in a
//! mutating document tree.
//!
//! A detection cycle copies the live tree out into an owned [`ScanNode`] tree
//! (only branches leading to marker leaves), promotes groups that contain the
//! secondary marker into [`MergedNode::Composite`] leaves, optionally draws the
//! diagnostics overlay and finally lets the selector suppress one region.
//! [`ConvergenceDetector`] repeats cycles and decides when the tree has settled.

pub mod convergence;
pub mod cycle;
pub mod differ;
pub mod events;
pub mod merger;
pub mod metrics;
pub mod model;
pub mod overlay;
pub mod policy;
pub mod scanner;
pub mod selector;

pub use convergence::{Convergence, ConvergenceDetector, StabilitySnapshot};
pub use cycle::{run_cycle, CycleAction, CycleOutcome};
pub use differ::same_tree;
pub use merger::{merge, promote};
pub use model::{MarkerKind, MergedNode, ScanNode, TreeShape};
pub use overlay::outline_tree;
pub use policy::{GuardRule, MarkerSignature, PatternProfile};
pub use scanner::scan;
pub use selector::{select, select_and_act, Selection};
