pub mod adapters;
pub mod capabilities;
pub mod config;
pub mod core;
pub mod domain;
pub mod host;
pub mod utils;

pub use adapters::{LookupSettings, ViaCepLookup};
pub use capabilities::{standard_registry, CapabilityArgs, CapabilityRegistry};
pub use core::{
    CancellationToken, ConsultationRequest, ConsultationResponse, ConsultationUseCase, MissKind,
};
pub use domain::model::{Address, PostalCode};
pub use utils::error::{AgentError, InvokeError, Result};
