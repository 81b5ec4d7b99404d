// Domain layer: models, service schemas and ports (interfaces).

pub mod model;
pub mod ports;
pub mod result;
pub mod services;
