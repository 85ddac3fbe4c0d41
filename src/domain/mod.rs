// Domain layer: source and target graph models, report types and the ports the
// transformation core consumes.

pub mod model;
pub mod ports;
pub mod source;
pub mod target;
