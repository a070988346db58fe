use crate::models::profile::{Aptitude, Indicator, StudentProfile};
use crate::models::recommendation::RecommendationRequest;

/// Normalizes a profile into the `/recommend` payload: language folded into
/// the grades, free text split into lists, absent aptitudes sent as 0.
pub fn build_payload(profile: &StudentProfile) -> RecommendationRequest {
    let aptitude = |kind| profile.aptitudes.score_or_zero(kind);
    let indicator = |slot| profile.indicator(slot);

    RecommendationRequest {
        grades: profile.resolved_grades(),
        interests: profile.interest_list(),
        skills: profile.skill_list(),
        linguistic: aptitude(Aptitude::Linguistic),
        musical: aptitude(Aptitude::Musical),
        bodily: aptitude(Aptitude::Bodily),
        logical_mathematical: aptitude(Aptitude::LogicalMathematical),
        spatial_visualization: aptitude(Aptitude::SpatialVisualization),
        interpersonal: aptitude(Aptitude::Interpersonal),
        intrapersonal: aptitude(Aptitude::Intrapersonal),
        naturalist: aptitude(Aptitude::Naturalist),
        p1: indicator(Indicator::P1),
        p2: indicator(Indicator::P2),
        p3: indicator(Indicator::P3),
        p4: indicator(Indicator::P4),
        p5: indicator(Indicator::P5),
        p6: indicator(Indicator::P6),
        p7: indicator(Indicator::P7),
        p8: indicator(Indicator::P8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{Grade, PerformanceLevel, Subject};
    use crate::testing::valid_profile;

    #[test]
    fn test_payload_includes_resolved_language() {
        let mut profile = valid_profile();
        profile.set_language(Some(Subject::French)).unwrap();
        let payload = build_payload(&profile);
        assert_eq!(payload.grades.get(&Subject::French), Some(&Grade::B));
        assert!(!payload.grades.contains_key(&Subject::English));
        assert_eq!(payload.grades.len(), 7);
    }

    #[test]
    fn test_free_text_is_split_and_cleaned() {
        let mut profile = valid_profile();
        profile.set_interests("Programming, , Reading,");
        profile.set_skills("  ");
        let payload = build_payload(&profile);
        assert_eq!(payload.interests, vec!["Programming", "Reading"]);
        assert!(payload.skills.is_empty());
    }

    #[test]
    fn test_absent_aptitudes_default_to_zero() {
        let mut profile = valid_profile();
        profile
            .set_aptitude(Aptitude::LogicalMathematical, Some(17))
            .unwrap();
        let payload = build_payload(&profile);
        assert_eq!(payload.logical_mathematical, 17);
        assert_eq!(payload.linguistic, 0);
        assert_eq!(payload.naturalist, 0);
    }

    #[test]
    fn test_indicators_verbatim() {
        let mut profile = valid_profile();
        profile.set_indicator(Indicator::P3, PerformanceLevel::Best);
        profile.set_indicator(Indicator::P8, PerformanceLevel::Poor);
        let payload = build_payload(&profile);
        assert_eq!(payload.p1, PerformanceLevel::Avg);
        assert_eq!(payload.p3, PerformanceLevel::Best);
        assert_eq!(payload.p8, PerformanceLevel::Poor);
    }
}
