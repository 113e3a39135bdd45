pub mod builder;
pub mod timing;
pub mod transitions;
