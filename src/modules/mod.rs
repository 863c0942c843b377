pub mod catalog;
pub mod profiles;

use kuuburi_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(catalog::create_module());
    registry.register(profiles::create_module());
}
