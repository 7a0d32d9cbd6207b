//! Geometry module: vector helpers, the nasal corridor, ICA centre-lines and
//! the anatomical structure catalogue.
//!
//! All geometry is expressed in corridor coordinates (cm): the nostril pivot
//! sits at the origin, +z points posteriorly toward the sella, +y superiorly
//! and +x to the patient's right.

mod anatomy;
mod corridor;
mod math;
mod vessel_path;

pub use anatomy::{AnatomicalStructure, AnatomyCatalogue, Range, StructureType, TissueProperties};
pub use corridor::Corridor;
pub use math::{
    clamp_to_box, closest_point_on_segment, finite_or, lerp_clamped, normalize_or,
    safe_normalize, GEOMETRY_EPSILON,
};
pub use vessel_path::{Side, VesselPath};
