pub mod diagnosis;
pub mod enums;
pub mod filters;
pub mod pond;
pub mod selection;

pub use diagnosis::*;
pub use filters::*;
pub use pond::*;
pub use selection::*;
