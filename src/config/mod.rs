//! Configuration module for loading simulation parameters.
//!
//! Each parameter group is stored as its own JSON file and falls back to
//! calibrated defaults when the file is missing or malformed.

mod parameters;

pub use parameters::{
    KinematicsParameters, Parameters, RuleParameters, ScoringParameters, ToolWallProfile,
    VesselParameters, WallParameters,
};
