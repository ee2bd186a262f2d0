// Domain layer: course records, wire schemas and the ports the views talk through.

pub mod model;
pub mod ports;
