//! Step-scoped eligibility rules over a [`StudentProfile`] snapshot.
//!
//! Every check returns the first violation found; messages are never
//! aggregated. The academic rules run in a fixed order:
//! 1. exactly 7 graded subjects (language grade folded in, under English
//!    when the selector is cleared)
//! 2. both core subjects graded
//! 3. a language and its grade selected
//! 4. at least 2 graded sciences

use thiserror::Error;

use crate::models::profile::{Aptitude, AssessmentStep, StudentProfile, Subject, CORE_SUBJECTS};

pub const REQUIRED_SUBJECT_COUNT: usize = 7;
pub const MIN_SCIENCE_COUNT: usize = 2;

/// A user-correctable rule violation, displayed verbatim at the current step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Please select exactly 7 subjects. These should be your 7 best-performed subjects.")]
    SubjectCount { found: usize },

    #[error("Please select a grade for the core subject: {0}.")]
    MissingCoreSubject(Subject),

    #[error("Please select one language and a grade for it.")]
    MissingLanguage,

    #[error("Please select a grade for at least 2 subjects from the Sciences category.")]
    InsufficientSciences { found: usize },

    #[error("{} must be between 1 and 20 (got {value}).", aptitude.label())]
    AptitudeOutOfRange { aptitude: Aptitude, value: u8 },

    #[error("{0} is not a language subject.")]
    NotALanguage(Subject),
}

/// Runs the blocking rules for one step.
pub fn validate_step(profile: &StudentProfile, step: AssessmentStep) -> Result<(), Violation> {
    match step {
        AssessmentStep::Academic => validate_academic(profile),
        // Aptitude and indicator inputs accept their defaults.
        AssessmentStep::Aptitude | AssessmentStep::Indicators => Ok(()),
    }
}

/// Runs every step's rules in step order. Used as the final gate before dispatch.
pub fn validate_profile(profile: &StudentProfile) -> Result<(), Violation> {
    AssessmentStep::ALL
        .iter()
        .try_for_each(|step| validate_step(profile, *step))
}

fn validate_academic(profile: &StudentProfile) -> Result<(), Violation> {
    let graded = profile.resolved_grades();

    if graded.len() != REQUIRED_SUBJECT_COUNT {
        return Err(Violation::SubjectCount {
            found: graded.len(),
        });
    }

    if let Some(missing) = CORE_SUBJECTS
        .iter()
        .find(|subject| !graded.contains_key(*subject))
    {
        return Err(Violation::MissingCoreSubject(*missing));
    }

    if profile.language.is_none() || profile.language_grade.is_none() {
        return Err(Violation::MissingLanguage);
    }

    let sciences = graded.keys().filter(|subject| subject.is_science()).count();
    if sciences < MIN_SCIENCE_COUNT {
        return Err(Violation::InsufficientSciences { found: sciences });
    }

    Ok(())
}
