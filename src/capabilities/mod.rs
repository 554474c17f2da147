//! Named operations exposed to an external host.
//!
//! Each provider lists its capabilities explicitly; [`CapabilityRegistry::build`]
//! turns them into an immutable name → handler table and rejects duplicate
//! names before any call is served.

pub mod args;
pub mod debug;
pub mod postal;
pub mod registry;

pub use args::{BoundArgs, CapabilityArgs};
pub use debug::DebugTools;
pub use postal::{PostalCodeTools, LOOKUP_CAPABILITY};
pub use registry::{
    Capability, CapabilityDescriptor, CapabilityHandler, CapabilityProvider, CapabilityRegistry,
};

use crate::core::{AddressLookup, ConsultationUseCase};
use crate::utils::error::RegistryError;
use std::sync::Arc;

/// Registry with every capability this process hosts.
pub fn standard_registry<L: AddressLookup + 'static>(
    use_case: Arc<ConsultationUseCase<L>>,
) -> Result<CapabilityRegistry, RegistryError> {
    let postal = PostalCodeTools::new(use_case);
    CapabilityRegistry::build(&[&postal, &DebugTools])
}
