// Domain layer: scouting models and the backend port. No transport code here.

pub mod model;
pub mod ports;
