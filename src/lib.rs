pub mod boiler;
pub mod cycles;
pub mod fault;
pub mod loads;
pub mod logger;
pub mod monitor;
pub mod report;

pub use fault::{classify, classify_detailed};
pub use loads::extract_loads;
