//! Physical models for the endonasal corridor.
//!
//! This module implements:
//! - Fulcrum-inverted lever kinematics for the endoscope and instrument
//! - Sphere-bound collision detection against the anatomy catalogue
//! - ICA proximity bands and the pulsatile micro-Doppler signal
//! - Zone-based medial wall resection with seeded bleeding

pub mod collision;
pub mod kinematics;
pub mod vessel;
pub mod wall;

pub use collision::{CollisionEngine, CollisionResult};
pub use kinematics::{BimanualPose, EndoscopeKinematics, LeverArm, SmoothingWindow};
pub use vessel::{DangerLevel, VesselProximity, VesselProximityModel};
pub use wall::{WallContact, WallInteraction, WallResectionGrid, MAX_BLOOD_LEVEL};
