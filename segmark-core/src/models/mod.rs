pub mod breakpoint;
pub mod label;

pub use breakpoint::Breakpoint;
pub use label::{Label, LabelError, LabelSet};
