//! Tumor scenario selected at session start.
//!
//! Knosp grading: Knosp E, Steiner E, Kitz K, Matula C. Neurosurgery 1993;
//! grade 3 subdivision after Micko et al., J Neurosurg 2015.

use serde::{Deserialize, Serialize};

/// Endocrine activity of the adenoma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TumorType {
    Functioning,
    NonFunctioning,
}

/// Hormone secreted by a functioning adenoma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HormoneSubtype {
    /// Cushing disease
    Acth,
    /// Acromegaly
    GrowthHormone,
    Prolactin,
    Tsh,
}

/// Cavernous sinus invasion grade (ordinal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KnospGrade {
    Grade0,
    Grade1,
    Grade2,
    Grade3A,
    Grade3B,
    Grade4,
}

impl KnospGrade {
    pub fn label(self) -> &'static str {
        match self {
            KnospGrade::Grade0 => "0",
            KnospGrade::Grade1 => "1",
            KnospGrade::Grade2 => "2",
            KnospGrade::Grade3A => "3A",
            KnospGrade::Grade3B => "3B",
            KnospGrade::Grade4 => "4",
        }
    }

    /// Grades 3A and above are considered cavernous sinus invasion.
    pub fn is_invasive(self) -> bool {
        self >= KnospGrade::Grade3A
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// < 1 cm
    Micro,
    /// 1-4 cm
    Macro,
    /// > 4 cm
    Giant,
}

/// What the operation is trying to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurgicalGoal {
    /// Endocrine cure; justifies medial wall resection
    Remission,
    /// Relieve mass effect while protecting the ICA
    Decompression,
    GrossTotalResection,
}

/// Immutable case description for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TumorScenario {
    pub name: String,
    pub tumor_type: TumorType,
    pub hormone: Option<HormoneSubtype>,
    pub knosp_grade: KnospGrade,
    pub size: SizeClass,
    pub invasive: bool,
    pub goal: SurgicalGoal,
}

impl TumorScenario {
    pub fn is_functioning(&self) -> bool {
        self.tumor_type == TumorType::Functioning
    }

    /// ACTH-secreting microadenoma with early medial wall invasion.
    pub fn cushing_disease() -> Self {
        Self {
            name: "Cushing disease".to_string(),
            tumor_type: TumorType::Functioning,
            hormone: Some(HormoneSubtype::Acth),
            knosp_grade: KnospGrade::Grade2,
            size: SizeClass::Micro,
            invasive: true,
            goal: SurgicalGoal::Remission,
        }
    }

    /// GH-secreting macroadenoma invading the superior cavernous compartment.
    pub fn acromegaly() -> Self {
        Self {
            name: "Acromegaly".to_string(),
            tumor_type: TumorType::Functioning,
            hormone: Some(HormoneSubtype::GrowthHormone),
            knosp_grade: KnospGrade::Grade3A,
            size: SizeClass::Macro,
            invasive: true,
            goal: SurgicalGoal::Remission,
        }
    }

    /// Non-functioning macroadenoma causing chiasmal compression.
    pub fn non_functioning_macroadenoma() -> Self {
        Self {
            name: "Non-functioning macroadenoma".to_string(),
            tumor_type: TumorType::NonFunctioning,
            hormone: None,
            knosp_grade: KnospGrade::Grade1,
            size: SizeClass::Macro,
            invasive: false,
            goal: SurgicalGoal::Decompression,
        }
    }

    /// Built-in scenarios, in menu order.
    pub fn presets() -> Vec<TumorScenario> {
        vec![
            Self::cushing_disease(),
            Self::acromegaly(),
            Self::non_functioning_macroadenoma(),
        ]
    }
}

impl Default for TumorScenario {
    fn default() -> Self {
        Self::non_functioning_macroadenoma()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knosp_ordering() {
        assert!(KnospGrade::Grade3A > KnospGrade::Grade2);
        assert!(KnospGrade::Grade3B > KnospGrade::Grade3A);
        assert!(KnospGrade::Grade3A.is_invasive());
        assert!(!KnospGrade::Grade2.is_invasive());
    }

    #[test]
    fn test_presets() {
        let presets = TumorScenario::presets();
        assert_eq!(presets.len(), 3);
        assert!(presets[0].is_functioning());
        assert!(!presets[2].is_functioning());
    }
}
