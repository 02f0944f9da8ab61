pub mod cohorts;
pub mod decode;
pub mod encode;
pub mod frame;
pub mod registry;

pub use cohorts::build_registry;
pub use registry::{Capabilities, Cohort, Registry, ResolvedTable};
