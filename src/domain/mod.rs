// Domain layer: models, response shapes and ports. No I/O here.

pub mod model;
pub mod payload;
pub mod ports;
