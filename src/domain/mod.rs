// Domain layer: forecast models and ports (interfaces).

pub mod model;
pub mod ports;
