pub(crate) mod builder;
pub(crate) mod core;

pub use builder::{build_graph, GraphBuilder};
pub use core::{DegreeOnePolicy, Graph};
