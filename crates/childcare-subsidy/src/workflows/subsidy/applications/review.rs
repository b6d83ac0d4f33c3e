use serde::Serialize;

use super::domain::{ApplicationDraft, Certification};
use super::eligibility::document_progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewSection {
    Personal,
    Contact,
    Household,
    Employment,
    Children,
    Provider,
    Documents,
    Certification,
}

impl ReviewSection {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewSection::Personal => "Personal Information",
            ReviewSection::Contact => "Contact Information",
            ReviewSection::Household => "Household",
            ReviewSection::Employment => "Employment",
            ReviewSection::Children => "Children",
            ReviewSection::Provider => "Provider",
            ReviewSection::Documents => "Documents",
            ReviewSection::Certification => "Certification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub section: ReviewSection,
    pub complete: bool,
}

/// Presence-only completeness view shown on the review page. Field rules are the
/// validators' job; this only answers "has the parent filled it in".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub sections: Vec<SectionStatus>,
}

impl ReviewSummary {
    pub fn for_draft(draft: &ApplicationDraft) -> Self {
        let applicant = &draft.applicant;
        let personal = filled(&applicant.first_name)
            && filled(&applicant.last_name)
            && applicant.date_of_birth.is_some()
            && filled(&applicant.ssn)
            && applicant.marital_status.is_some()
            && applicant.primary_language.is_some();

        let contact = &draft.contact;
        let contact_complete = filled(&contact.street_address)
            && filled(&contact.city)
            && filled(&contact.zip_code)
            && contact.county.as_deref().is_some_and(filled)
            && filled(&contact.phone)
            && filled(&contact.email)
            && contact.preferred_contact_method.is_some();

        let household = &draft.household;
        let household_complete = household.size.is_some()
            && household.dependents.is_some()
            && household.monthly_income.is_some()
            && household.income_frequency.is_some()
            && household.primary_income_source.is_some();

        let employment = &draft.employment;
        let employment_complete = match employment.status {
            None => false,
            Some(status) if status.is_working() => {
                employment.hours_per_week.is_some() && employment.gross_monthly_income.is_some()
            }
            Some(_) => true,
        };

        let children_complete = !draft.children.is_empty()
            && draft.children.iter().all(|child| {
                filled(&child.first_name)
                    && filled(&child.last_name)
                    && child.date_of_birth.is_some()
                    && filled(&child.ssn)
                    && child.relationship.is_some()
                    && !child.care_needed.is_empty()
                    && child.preferred_start_date.is_some()
            });

        let provider_complete = draft
            .provider_selection
            .as_ref()
            .is_some_and(|selection| filled(&selection.provider_id));

        let certification_complete = Certification::ALL
            .into_iter()
            .all(|certification| draft.certifications.is_acknowledged(certification))
            && filled(&draft.signature.full_name);

        let sections = vec![
            SectionStatus {
                section: ReviewSection::Personal,
                complete: personal,
            },
            SectionStatus {
                section: ReviewSection::Contact,
                complete: contact_complete,
            },
            SectionStatus {
                section: ReviewSection::Household,
                complete: household_complete,
            },
            SectionStatus {
                section: ReviewSection::Employment,
                complete: employment_complete,
            },
            SectionStatus {
                section: ReviewSection::Children,
                complete: children_complete,
            },
            SectionStatus {
                section: ReviewSection::Provider,
                complete: provider_complete,
            },
            SectionStatus {
                section: ReviewSection::Documents,
                complete: document_progress(draft).is_complete(),
            },
            SectionStatus {
                section: ReviewSection::Certification,
                complete: certification_complete,
            },
        ];

        Self { sections }
    }

    pub fn all_complete(&self) -> bool {
        self.sections.iter().all(|status| status.complete)
    }

    pub fn incomplete(&self) -> impl Iterator<Item = ReviewSection> + '_ {
        self.sections
            .iter()
            .filter(|status| !status.complete)
            .map(|status| status.section)
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}
