use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::Violation;

// ────────────────────────────────────────────────────────────────────────────
// Subject catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectCategory {
    Core,
    Language,
    Sciences,
    AppliedSciences,
    Humanities,
    CreativeArts,
    Technical,
}

impl SubjectCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SubjectCategory::Core => "Core Subjects",
            SubjectCategory::Language => "Languages",
            SubjectCategory::Sciences => "Sciences",
            SubjectCategory::AppliedSciences => "Applied sciences",
            SubjectCategory::Humanities => "Humanities",
            SubjectCategory::CreativeArts => "Creative arts",
            SubjectCategory::Technical => "Technical subjects",
        }
    }
}

/// A gradable subject. Serialized by its display name, which is also the key
/// the scoring service expects in the `grades` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    Kiswahili,
    English,
    Arabic,
    German,
    French,
    Chemistry,
    Physics,
    Biology,
    #[serde(rename = "Home Science")]
    HomeScience,
    Agriculture,
    #[serde(rename = "Computer Studies")]
    ComputerStudies,
    #[serde(rename = "Business Studies")]
    BusinessStudies,
    History,
    Geography,
    #[serde(rename = "Religious Education")]
    ReligiousEducation,
    Music,
    #[serde(rename = "Art and Design")]
    ArtAndDesign,
    #[serde(rename = "Drawing and Design")]
    DrawingAndDesign,
    #[serde(rename = "Building Construction")]
    BuildingConstruction,
    #[serde(rename = "Power and Mechanics")]
    PowerAndMechanics,
    Metalwork,
    Aviation,
    Woodwork,
    Electronics,
}

/// Compulsory regardless of category, checked in this order.
pub const CORE_SUBJECTS: [Subject; 2] = [Subject::Mathematics, Subject::Kiswahili];

pub const LANGUAGE_SUBJECTS: [Subject; 4] = [
    Subject::English,
    Subject::Arabic,
    Subject::German,
    Subject::French,
];

pub const SCIENCE_SUBJECTS: [Subject; 3] = [Subject::Chemistry, Subject::Physics, Subject::Biology];

impl Subject {
    pub const ALL: [Subject; 25] = [
        Subject::Mathematics,
        Subject::Kiswahili,
        Subject::English,
        Subject::Arabic,
        Subject::German,
        Subject::French,
        Subject::Chemistry,
        Subject::Physics,
        Subject::Biology,
        Subject::HomeScience,
        Subject::Agriculture,
        Subject::ComputerStudies,
        Subject::BusinessStudies,
        Subject::History,
        Subject::Geography,
        Subject::ReligiousEducation,
        Subject::Music,
        Subject::ArtAndDesign,
        Subject::DrawingAndDesign,
        Subject::BuildingConstruction,
        Subject::PowerAndMechanics,
        Subject::Metalwork,
        Subject::Aviation,
        Subject::Woodwork,
        Subject::Electronics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Kiswahili => "Kiswahili",
            Subject::English => "English",
            Subject::Arabic => "Arabic",
            Subject::German => "German",
            Subject::French => "French",
            Subject::Chemistry => "Chemistry",
            Subject::Physics => "Physics",
            Subject::Biology => "Biology",
            Subject::HomeScience => "Home Science",
            Subject::Agriculture => "Agriculture",
            Subject::ComputerStudies => "Computer Studies",
            Subject::BusinessStudies => "Business Studies",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::ReligiousEducation => "Religious Education",
            Subject::Music => "Music",
            Subject::ArtAndDesign => "Art and Design",
            Subject::DrawingAndDesign => "Drawing and Design",
            Subject::BuildingConstruction => "Building Construction",
            Subject::PowerAndMechanics => "Power and Mechanics",
            Subject::Metalwork => "Metalwork",
            Subject::Aviation => "Aviation",
            Subject::Woodwork => "Woodwork",
            Subject::Electronics => "Electronics",
        }
    }

    pub fn category(&self) -> SubjectCategory {
        match self {
            Subject::Mathematics | Subject::Kiswahili => SubjectCategory::Core,
            Subject::English | Subject::Arabic | Subject::German | Subject::French => {
                SubjectCategory::Language
            }
            Subject::Chemistry | Subject::Physics | Subject::Biology => SubjectCategory::Sciences,
            Subject::HomeScience
            | Subject::Agriculture
            | Subject::ComputerStudies
            | Subject::BusinessStudies => SubjectCategory::AppliedSciences,
            Subject::History | Subject::Geography | Subject::ReligiousEducation => {
                SubjectCategory::Humanities
            }
            Subject::Music | Subject::ArtAndDesign => SubjectCategory::CreativeArts,
            Subject::DrawingAndDesign
            | Subject::BuildingConstruction
            | Subject::PowerAndMechanics
            | Subject::Metalwork
            | Subject::Aviation
            | Subject::Woodwork
            | Subject::Electronics => SubjectCategory::Technical,
        }
    }

    pub fn is_language(&self) -> bool {
        self.category() == SubjectCategory::Language
    }

    pub fn is_science(&self) -> bool {
        self.category() == SubjectCategory::Sciences
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Subject::ALL
            .iter()
            .copied()
            .find(|subject| subject.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown subject '{needle}'"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grades
// ────────────────────────────────────────────────────────────────────────────

/// The 12 grade bands, declared from highest to lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    D,
    #[serde(rename = "D-")]
    DMinus,
    E,
}

impl Grade {
    pub const ALL: [Grade; 12] = [
        Grade::A,
        Grade::AMinus,
        Grade::BPlus,
        Grade::B,
        Grade::BMinus,
        Grade::CPlus,
        Grade::C,
        Grade::CMinus,
        Grade::DPlus,
        Grade::D,
        Grade::DMinus,
        Grade::E,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::DMinus => "D-",
            Grade::E => "E",
        }
    }

    /// Points awarded by the scoring service: A = 12 down to E = 1.
    pub fn points(&self) -> u32 {
        let rank = Grade::ALL
            .iter()
            .position(|g| g == self)
            .unwrap_or(Grade::ALL.len() - 1);
        (Grade::ALL.len() - rank) as u32
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_uppercase();
        Grade::ALL
            .iter()
            .copied()
            .find(|grade| grade.label() == needle)
            .ok_or_else(|| format!("Unknown grade '{}'", s.trim()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aptitudes and performance indicators
// ────────────────────────────────────────────────────────────────────────────

pub const APTITUDE_MIN: u8 = 1;
pub const APTITUDE_MAX: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aptitude {
    Linguistic,
    Musical,
    Bodily,
    LogicalMathematical,
    SpatialVisualization,
    Interpersonal,
    Intrapersonal,
    Naturalist,
}

impl Aptitude {
    pub const ALL: [Aptitude; 8] = [
        Aptitude::Linguistic,
        Aptitude::Musical,
        Aptitude::Bodily,
        Aptitude::LogicalMathematical,
        Aptitude::SpatialVisualization,
        Aptitude::Interpersonal,
        Aptitude::Intrapersonal,
        Aptitude::Naturalist,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Aptitude::Linguistic => "Linguistic",
            Aptitude::Musical => "Musical",
            Aptitude::Bodily => "Bodily",
            Aptitude::LogicalMathematical => "Logical - Mathematical",
            Aptitude::SpatialVisualization => "Spatial-Visualization",
            Aptitude::Interpersonal => "Interpersonal",
            Aptitude::Intrapersonal => "Intrapersonal",
            Aptitude::Naturalist => "Naturalist",
        }
    }
}

/// Eight optional aptitude scores. Absent scores are sent as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AptitudeScores {
    pub linguistic: Option<u8>,
    pub musical: Option<u8>,
    pub bodily: Option<u8>,
    pub logical_mathematical: Option<u8>,
    pub spatial_visualization: Option<u8>,
    pub interpersonal: Option<u8>,
    pub intrapersonal: Option<u8>,
    pub naturalist: Option<u8>,
}

impl AptitudeScores {
    pub fn get(&self, aptitude: Aptitude) -> Option<u8> {
        *self.slot(aptitude)
    }

    /// Score as dispatched to the scoring service.
    pub fn score_or_zero(&self, aptitude: Aptitude) -> u8 {
        self.get(aptitude).unwrap_or(0)
    }

    fn slot(&self, aptitude: Aptitude) -> &Option<u8> {
        match aptitude {
            Aptitude::Linguistic => &self.linguistic,
            Aptitude::Musical => &self.musical,
            Aptitude::Bodily => &self.bodily,
            Aptitude::LogicalMathematical => &self.logical_mathematical,
            Aptitude::SpatialVisualization => &self.spatial_visualization,
            Aptitude::Interpersonal => &self.interpersonal,
            Aptitude::Intrapersonal => &self.intrapersonal,
            Aptitude::Naturalist => &self.naturalist,
        }
    }

    fn slot_mut(&mut self, aptitude: Aptitude) -> &mut Option<u8> {
        match aptitude {
            Aptitude::Linguistic => &mut self.linguistic,
            Aptitude::Musical => &mut self.musical,
            Aptitude::Bodily => &mut self.bodily,
            Aptitude::LogicalMathematical => &mut self.logical_mathematical,
            Aptitude::SpatialVisualization => &mut self.spatial_visualization,
            Aptitude::Interpersonal => &mut self.interpersonal,
            Aptitude::Intrapersonal => &mut self.intrapersonal,
            Aptitude::Naturalist => &mut self.naturalist,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PerformanceLevel {
    Poor,
    #[default]
    Avg,
    Best,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
}

impl Indicator {
    pub const ALL: [Indicator; 8] = [
        Indicator::P1,
        Indicator::P2,
        Indicator::P3,
        Indicator::P4,
        Indicator::P5,
        Indicator::P6,
        Indicator::P7,
        Indicator::P8,
    ];

    pub fn label(&self) -> String {
        format!("P{}", *self as usize + 1)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

/// The three wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStep {
    Academic,
    Aptitude,
    Indicators,
}

impl AssessmentStep {
    pub const ALL: [AssessmentStep; 3] = [
        AssessmentStep::Academic,
        AssessmentStep::Aptitude,
        AssessmentStep::Indicators,
    ];

    pub fn first() -> Self {
        AssessmentStep::Academic
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            AssessmentStep::Academic => Some(AssessmentStep::Aptitude),
            AssessmentStep::Aptitude => Some(AssessmentStep::Indicators),
            AssessmentStep::Indicators => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            AssessmentStep::Academic => None,
            AssessmentStep::Aptitude => Some(AssessmentStep::Academic),
            AssessmentStep::Indicators => Some(AssessmentStep::Aptitude),
        }
    }

    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }
}

/// In-progress academic and aptitude dataset for one assessment.
///
/// Ungraded subjects are simply absent from `grades`. The selected language is
/// held apart from `grades` and folded in by [`StudentProfile::resolved_grades`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub grades: BTreeMap<Subject, Grade>,
    pub language: Option<Subject>,
    pub language_grade: Option<Grade>,
    pub interests: String,
    pub skills: String,
    pub aptitudes: AptitudeScores,
    pub indicators: [PerformanceLevel; 8],
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            grades: BTreeMap::new(),
            language: Some(Subject::English),
            language_grade: None,
            interests: "Music".to_string(),
            skills: "Communication".to_string(),
            aptitudes: AptitudeScores::default(),
            indicators: [PerformanceLevel::Avg; 8],
        }
    }
}

impl StudentProfile {
    /// Sets or clears (`None`) the grade for a subject.
    pub fn set_grade(&mut self, subject: Subject, grade: Option<Grade>) {
        match grade {
            Some(grade) => {
                self.grades.insert(subject, grade);
            }
            None => {
                self.grades.remove(&subject);
            }
        }
    }

    /// Selects (or clears) the language subject. Only language subjects are accepted.
    pub fn set_language(&mut self, language: Option<Subject>) -> Result<(), Violation> {
        if let Some(subject) = language {
            if !subject.is_language() {
                return Err(Violation::NotALanguage(subject));
            }
        }
        self.language = language;
        Ok(())
    }

    pub fn set_language_grade(&mut self, grade: Option<Grade>) {
        self.language_grade = grade;
    }

    pub fn set_interests(&mut self, text: impl Into<String>) {
        self.interests = text.into();
    }

    pub fn set_skills(&mut self, text: impl Into<String>) {
        self.skills = text.into();
    }

    /// Sets or clears an aptitude score; values outside 1..=20 leave the profile unchanged.
    pub fn set_aptitude(&mut self, aptitude: Aptitude, score: Option<u8>) -> Result<(), Violation> {
        if let Some(value) = score {
            if !(APTITUDE_MIN..=APTITUDE_MAX).contains(&value) {
                return Err(Violation::AptitudeOutOfRange { aptitude, value });
            }
        }
        *self.aptitudes.slot_mut(aptitude) = score;
        Ok(())
    }

    pub fn set_indicator(&mut self, indicator: Indicator, level: PerformanceLevel) {
        self.indicators[indicator as usize] = level;
    }

    pub fn indicator(&self, indicator: Indicator) -> PerformanceLevel {
        self.indicators[indicator as usize]
    }

    /// Subject grades with the language grade folded in under the selected
    /// language, or English when the selector is cleared. The language
    /// assignment overwrites any direct entry for the same subject.
    pub fn resolved_grades(&self) -> BTreeMap<Subject, Grade> {
        let mut resolved = self.grades.clone();
        if let Some(grade) = self.language_grade {
            resolved.insert(self.language.unwrap_or(Subject::English), grade);
        }
        resolved
    }

    /// Re-runs the setter checks on a profile built without them (e.g. deserialized).
    pub fn check_inputs(&self) -> Result<(), Violation> {
        if let Some(subject) = self.language.filter(|s| !s.is_language()) {
            return Err(Violation::NotALanguage(subject));
        }
        for aptitude in Aptitude::ALL {
            if let Some(value) = self.aptitudes.get(aptitude) {
                if !(APTITUDE_MIN..=APTITUDE_MAX).contains(&value) {
                    return Err(Violation::AptitudeOutOfRange { aptitude, value });
                }
            }
        }
        Ok(())
    }

    pub fn interest_list(&self) -> Vec<String> {
        split_list(&self.interests)
    }

    pub fn skill_list(&self) -> Vec<String> {
        split_list(&self.skills)
    }
}

/// Splits comma-separated free text, trimming tokens and dropping empty ones.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
