//! Tip-versus-anatomy collision detection.
//!
//! Every structure is a bounding sphere; the catalogue holds a few dozen
//! entries so a linear scan is used. The first overlapping structure in
//! catalogue order is reported, which keeps results deterministic when
//! spheres overlap.

use glam::Vec3;

use crate::geometry::{normalize_or, AnatomicalStructure};

/// Outcome of a collision query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult<'a> {
    pub is_colliding: bool,
    pub structure: Option<&'a AnatomicalStructure>,
    /// How far the tip is inside the sphere (cm)
    pub penetration_depth_cm: f32,
    /// Outward unit normal at the contact
    pub normal: Vec3,
}

impl CollisionResult<'_> {
    pub fn none() -> Self {
        Self {
            is_colliding: false,
            structure: None,
            penetration_depth_cm: 0.0,
            normal: Vec3::ZERO,
        }
    }
}

/// Sphere-bound collision queries against a static catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionEngine;

impl CollisionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Test `tip` against `structures` in order; the first with
    /// `distance < radius` wins.
    pub fn check<'a>(&self, tip: Vec3, structures: &'a [AnatomicalStructure]) -> CollisionResult<'a> {
        for structure in structures {
            let offset = tip - structure.center;
            let distance = offset.length();
            if distance < structure.radius_cm {
                // Tip exactly at the centre: push back toward the nostril
                let normal = normalize_or(offset, Vec3::NEG_Z);
                return CollisionResult {
                    is_colliding: true,
                    structure: Some(structure),
                    penetration_depth_cm: structure.radius_cm - distance,
                    normal,
                };
            }
        }
        CollisionResult::none()
    }

    /// All structures overlapping `tip`, in catalogue order.
    pub fn contacts<'a>(
        &self,
        tip: Vec3,
        structures: &'a [AnatomicalStructure],
    ) -> impl Iterator<Item = &'a AnatomicalStructure> {
        structures
            .iter()
            .filter(move |s| tip.distance(s.center) < s.radius_cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Range, StructureType};

    fn sphere(id: &str, center: Vec3, radius_cm: f32) -> AnatomicalStructure {
        AnatomicalStructure {
            id: id.to_string(),
            name: id.to_string(),
            structure_type: StructureType::Bone,
            center,
            radius_cm,
            is_critical: false,
            visible_depth: Range::new(0.0, 100.0),
            visible_angle: Range::new(0.0, 70.0),
            tissue: None,
        }
    }

    #[test]
    fn test_no_collision_outside() {
        let structures = vec![sphere("a", Vec3::ZERO, 1.0)];
        let result = CollisionEngine::new().check(Vec3::new(2.0, 0.0, 0.0), &structures);
        assert!(!result.is_colliding);
        assert!(result.structure.is_none());
    }

    #[test]
    fn test_boundary_is_not_colliding() {
        let structures = vec![sphere("a", Vec3::ZERO, 1.0)];
        let result = CollisionEngine::new().check(Vec3::new(1.0, 0.0, 0.0), &structures);
        assert!(!result.is_colliding, "d == r must not collide");
    }

    #[test]
    fn test_penetration_and_normal() {
        let structures = vec![sphere("a", Vec3::new(0.0, 0.0, 5.0), 1.0)];
        let result = CollisionEngine::new().check(Vec3::new(0.0, 0.6, 5.0), &structures);
        assert!(result.is_colliding);
        assert!((result.penetration_depth_cm - 0.4).abs() < 1e-6);
        assert!((result.normal - Vec3::Y).length() < 1e-6);
        assert_eq!(result.structure.unwrap().id, "a");
    }

    #[test]
    fn test_first_match_wins() {
        let structures = vec![
            sphere("first", Vec3::ZERO, 1.0),
            sphere("second", Vec3::new(0.1, 0.0, 0.0), 2.0),
        ];
        let result = CollisionEngine::new().check(Vec3::new(0.05, 0.0, 0.0), &structures);
        assert_eq!(result.structure.unwrap().id, "first");

        let all: Vec<_> = CollisionEngine::new()
            .contacts(Vec3::new(0.05, 0.0, 0.0), &structures)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(all, vec!["first", "second"]);
    }

    #[test]
    fn test_tip_at_centre_has_finite_normal() {
        let structures = vec![sphere("a", Vec3::ONE, 0.5)];
        let result = CollisionEngine::new().check(Vec3::ONE, &structures);
        assert!(result.is_colliding);
        assert_eq!(result.normal, Vec3::NEG_Z);
        assert!((result.penetration_depth_cm - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_catalogue() {
        let result = CollisionEngine::new().check(Vec3::ZERO, &[]);
        assert!(!result.is_colliding);
    }
}
