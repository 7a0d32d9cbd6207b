//! Static anatomical structure catalogue.
//!
//! Structures are approximated by bounding spheres in corridor coordinates
//! (cm). The catalogue is built once per session and never mutated.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tissue class of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    Bone,
    Tissue,
    Vessel,
    Nerve,
    Tumor,
    Landmark,
    Dura,
    Gland,
}

/// Haptic/visual tissue properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TissueProperties {
    /// Relative resistance to instrument advance (0 = none, 1 = rigid)
    pub resistance: f32,
    /// Bleeds on contact
    pub vascularized: bool,
    /// Moves with the heartbeat
    pub pulsating: bool,
}

/// Closed interval used for visibility ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One entry in the anatomy catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomicalStructure {
    pub id: String,
    pub name: String,
    pub structure_type: StructureType,
    /// Bounding sphere centre (cm)
    pub center: Vec3,
    /// Bounding sphere radius (cm)
    pub radius_cm: f32,
    /// Contact is a complication
    pub is_critical: bool,
    /// Insertion depth range (%) over which the structure is in view
    pub visible_depth: Range,
    /// Scope angle range (degrees) over which the structure is in view
    pub visible_angle: Range,
    pub tissue: Option<TissueProperties>,
}

impl AnatomicalStructure {
    /// Whether the structure is in the field of view at this depth and lens angle.
    pub fn is_visible(&self, depth_percent: f32, angle_deg: f32) -> bool {
        self.visible_depth.contains(depth_percent) && self.visible_angle.contains(angle_deg)
    }

    /// Nasal mucosa: soft tissue whose contact is counted as mucosal trauma.
    pub fn is_mucosa(&self) -> bool {
        self.structure_type == StructureType::Tissue
    }
}

/// Immutable, ordered collection of structures.
///
/// Order matters: collision queries report the first overlapping structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomyCatalogue {
    structures: Vec<AnatomicalStructure>,
}

impl AnatomyCatalogue {
    pub fn new(structures: Vec<AnatomicalStructure>) -> Self {
        Self { structures }
    }

    pub fn structures(&self) -> &[AnatomicalStructure] {
        &self.structures
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AnatomicalStructure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Structures in view at the given depth and lens angle.
    pub fn visible(&self, depth_percent: f32, angle_deg: f32) -> impl Iterator<Item = &AnatomicalStructure> {
        self.structures
            .iter()
            .filter(move |s| s.is_visible(depth_percent, angle_deg))
    }
}

#[allow(clippy::too_many_arguments)]
fn structure(
    id: &str,
    name: &str,
    structure_type: StructureType,
    center: (f32, f32, f32),
    radius_cm: f32,
    is_critical: bool,
    visible_depth: Range,
    visible_angle: Range,
    tissue: Option<TissueProperties>,
) -> AnatomicalStructure {
    AnatomicalStructure {
        id: id.to_string(),
        name: name.to_string(),
        structure_type,
        center: Vec3::new(center.0, center.1, center.2),
        radius_cm,
        is_critical,
        visible_depth,
        visible_angle,
        tissue,
    }
}

const ALL_ANGLES: Range = Range::new(0.0, 70.0);
const ANGLED_ONLY: Range = Range::new(30.0, 70.0);

const MUCOSA: TissueProperties = TissueProperties {
    resistance: 0.3,
    vascularized: true,
    pulsating: false,
};

const CAVERNOUS_ICA: TissueProperties = TissueProperties {
    resistance: 0.6,
    vascularized: true,
    pulsating: true,
};

impl Default for AnatomyCatalogue {
    /// Standard endonasal transsphenoidal anatomy, anterior to posterior.
    fn default() -> Self {
        use StructureType::*;

        let nasal = Range::new(0.0, 55.0);
        let sphenoid = Range::new(40.0, 85.0);
        let sellar = Range::new(65.0, 100.0);

        Self::new(vec![
            structure("inferior_turbinate_left", "Left Inferior Turbinate", Tissue, (-1.3, -1.2, 2.5), 0.6, false, nasal, ALL_ANGLES, Some(MUCOSA)),
            structure("inferior_turbinate_right", "Right Inferior Turbinate", Tissue, (1.3, -1.2, 2.5), 0.6, false, nasal, ALL_ANGLES, Some(MUCOSA)),
            structure("middle_turbinate_left", "Left Middle Turbinate", Tissue, (-1.2, 0.5, 4.2), 0.5, false, nasal, ALL_ANGLES, Some(MUCOSA)),
            structure("middle_turbinate_right", "Right Middle Turbinate", Tissue, (1.2, 0.5, 4.2), 0.5, false, nasal, ALL_ANGLES, Some(MUCOSA)),
            structure("nasal_septum", "Posterior Nasal Septum", Tissue, (0.0, 1.5, 3.5), 0.45, false, Range::new(0.0, 60.0), ALL_ANGLES, Some(MUCOSA)),
            structure("sphenoid_rostrum", "Sphenoid Rostrum", Bone, (0.0, -1.3, 6.2), 0.5, false, sphenoid, ALL_ANGLES, None),
            structure("sella_floor", "Sellar Floor", Bone, (0.0, -1.2, 8.4), 0.5, false, sellar, ALL_ANGLES, None),
            structure("optic_nerve_left", "Left Optic Nerve", Nerve, (-0.9, 1.35, 8.7), 0.3, true, sellar, ALL_ANGLES, None),
            structure("optic_nerve_right", "Right Optic Nerve", Nerve, (0.9, 1.35, 8.7), 0.3, true, sellar, ALL_ANGLES, None),
            structure("ocr_left", "Left Optico-Carotid Recess", Landmark, (-1.6, 1.0, 8.2), 0.25, false, sellar, ANGLED_ONLY, None),
            structure("ocr_right", "Right Optico-Carotid Recess", Landmark, (1.6, 1.0, 8.2), 0.25, false, sellar, ANGLED_ONLY, None),
            structure("ica_left", "Left Cavernous ICA", Vessel, (-2.45, 0.0, 8.6), 0.5, true, sellar, ALL_ANGLES, Some(CAVERNOUS_ICA)),
            structure("ica_right", "Right Cavernous ICA", Vessel, (2.45, 0.0, 8.6), 0.5, true, sellar, ALL_ANGLES, Some(CAVERNOUS_ICA)),
            structure("sellar_dura", "Sellar Dura", Dura, (0.0, 0.8, 9.6), 0.35, false, sellar, ALL_ANGLES, None),
            structure("pituitary_gland", "Normal Pituitary Gland", Gland, (0.0, 0.3, 9.7), 0.4, false, sellar, ALL_ANGLES, None),
            structure("tumor", "Pituitary Adenoma", Tumor, (0.0, -0.2, 9.1), 0.6, false, sellar, ALL_ANGLES, None),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_ids_unique() {
        let catalogue = AnatomyCatalogue::default();
        let mut ids: Vec<&str> = catalogue.structures().iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalogue.len());
    }

    #[test]
    fn test_midline_corridor_is_clear() {
        // The straight path along the pivot axis up to the sella must not hit anything
        let catalogue = AnatomyCatalogue::default();
        for i in 0..=80 {
            let p = Vec3::new(0.0, 0.0, i as f32 * 0.1);
            for s in catalogue.structures() {
                assert!(
                    p.distance(s.center) >= s.radius_cm,
                    "Midline point {:?} is inside {}",
                    p,
                    s.id
                );
            }
        }
    }

    #[test]
    fn test_recess_needs_angled_scope() {
        let catalogue = AnatomyCatalogue::default();
        let ocr = catalogue.get("ocr_left").unwrap();
        assert!(!ocr.is_visible(80.0, 0.0));
        assert!(ocr.is_visible(80.0, 30.0));
    }

    #[test]
    fn test_visible_filter() {
        let catalogue = AnatomyCatalogue::default();
        let shallow: Vec<_> = catalogue.visible(10.0, 0.0).map(|s| s.id.as_str()).collect();
        assert!(shallow.contains(&"inferior_turbinate_left"));
        assert!(!shallow.contains(&"tumor"));
    }
}
