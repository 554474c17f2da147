// Domain layer: postal-code value type, address entity and the lookup port.

pub mod model;
pub mod ports;
