#![deny(missing_docs)]

//! # Schema Pipeline
//!
//! - **classify**: one schema node to one [`classify::SchemaClass`].
//! - **visitor**: reachable schemas and their structural paths.
//! - **tree**: final, unique names for everything that needs one.
//! - **unions**: discriminator tags and variant nesting for `oneOf` schemas.

pub mod classify;
pub mod tree;
pub mod unions;
pub mod visitor;

pub use classify::{classify, SchemaClass};
pub use tree::{build_model_tree, ModelNode, ModelTree, NameRegistry};
pub use unions::{resolve_unions, SealedResolution, UnionResolution};
pub use visitor::{collect_reachable, Reachability, ReachableSchema};
