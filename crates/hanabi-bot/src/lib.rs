pub mod policy;

pub use policy::{
    PerfectPlayPolicy, Policy, PolicyContext, PolicyKind, RandomPolicy, Usefulness,
};
