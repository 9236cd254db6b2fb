pub mod engine;
pub mod renderer;
pub mod results;

pub use engine::{MonikerService, ResolveError};
pub use results::{
    CallerIdentity, DescribeResult, LineageResult, ListResult, ResolveResult, ResolvedSource,
};
