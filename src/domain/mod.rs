// Domain layer - Locations, observations and interpolation
pub mod interpolation;
pub mod location;
pub mod observation;
