// Adapters layer: concrete implementations of the domain ports.

pub mod via_cep;

pub use via_cep::{LookupSettings, ViaCepLookup};
