// Domain layer: value objects and ports shared by the scoring core, renderers and adapters.

pub mod model;
pub mod ports;
