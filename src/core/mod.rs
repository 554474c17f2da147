pub mod cancellation;
pub mod consultation;

pub use crate::domain::model::{Address, PostalCode};
pub use crate::domain::ports::AddressLookup;
pub use cancellation::CancellationToken;
pub use consultation::{
    ConsultationRequest, ConsultationResponse, ConsultationUseCase, FoundAddress, Miss, MissKind,
};
