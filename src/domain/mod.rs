// Domain layer: core models and ports (interfaces). No dependencies beyond
// std/serde; concrete storage and config live behind the ports.

pub mod model;
pub mod ports;
