pub mod legacy;
pub mod modern;

use crate::registry::Registry;

/// Builds the registry this server actually runs with: the modern root
/// cohort plus every legacy override cohort spec.md §4.1 enumerates.
pub fn build_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(modern::build());
    for cohort in legacy::build_all() {
        registry.register(cohort);
    }
    registry
}
