pub mod partition;
pub mod tokenize;
pub mod types;

pub use partition::{partition, split};
pub use tokenize::tokenize;
pub use types::{Command, ControlOperator};
