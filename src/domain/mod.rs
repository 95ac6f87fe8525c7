// Domain layer: response-shaped records, run outcomes and ports (interfaces).

pub mod model;
pub mod ports;
