use serde::{Deserialize, Serialize};

use super::domain::{ApplicationDraft, Child, DocumentKind, EmploymentStatus, Household};
use crate::config::{ProgramConfig, FPL_TABLE_SIZES};

/// Annual poverty guideline for a household of `size` people (sizes below 1 use the 1-person row).
pub fn annual_fpl_threshold(program: &ProgramConfig, size: u8) -> u32 {
    let size = usize::from(size.max(1));
    if size <= FPL_TABLE_SIZES {
        return program.fpl_annual_thresholds[size - 1];
    }

    let extra = (size - FPL_TABLE_SIZES) as u32;
    program.fpl_annual_thresholds[FPL_TABLE_SIZES - 1] + program.fpl_additional_person * extra
}

/// `round(monthly_income * 12 / threshold(size) * 100)`; `None` until both inputs are positive.
pub fn poverty_level_percentage(
    program: &ProgramConfig,
    size: u8,
    monthly_income: f64,
) -> Option<u32> {
    if size == 0 || !monthly_income.is_finite() || monthly_income <= 0.0 {
        return None;
    }

    let threshold = f64::from(annual_fpl_threshold(program, size));
    let percentage = (monthly_income * 12.0 / threshold * 100.0).round();
    Some(percentage.min(f64::from(u32::MAX)) as u32)
}

/// Advisory comparison against the program ceiling; never blocks submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub fpl_percentage: u32,
    pub ceiling: u32,
    pub within_ceiling: bool,
}

pub fn assess_household(
    program: &ProgramConfig,
    household: &Household,
) -> Option<EligibilityAssessment> {
    let fpl_percentage =
        poverty_level_percentage(program, household.size?, household.monthly_income?)?;
    Some(EligibilityAssessment {
        fpl_percentage,
        ceiling: program.fpl_ceiling_percentage,
        within_ceiling: fpl_percentage <= program.fpl_ceiling_percentage,
    })
}

/// One entry of the derived upload checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredDocument {
    pub kind: DocumentKind,
    pub label: String,
    pub description: &'static str,
    /// Present only because of employment status or special needs.
    pub conditional: bool,
}

impl RequiredDocument {
    fn fixed(kind: DocumentKind, label: &str, description: &'static str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            description,
            conditional: false,
        }
    }
}

/// Checklist derived from employment status and the children list, rebuilt on every call.
pub fn required_documents(
    status: Option<EmploymentStatus>,
    children: &[Child],
) -> Vec<RequiredDocument> {
    let mut documents = vec![
        RequiredDocument::fixed(
            DocumentKind::IncomeProof,
            "Proof of Income",
            "Pay stubs, tax returns, etc.",
        ),
        RequiredDocument::fixed(
            DocumentKind::IdentityDocument,
            "Identity Document",
            "Driver's license or State ID",
        ),
        RequiredDocument::fixed(
            DocumentKind::ResidencyProof,
            "Proof of Residency",
            "Utility bill or lease agreement",
        ),
    ];

    if status.is_some_and(EmploymentStatus::is_working) {
        documents.push(RequiredDocument {
            kind: DocumentKind::EmploymentVerification,
            label: "Employment Verification".to_string(),
            description: "Employer letter, work schedule",
            conditional: true,
        });
    }

    for (index, child) in children.iter().enumerate() {
        let name = match child.first_name.trim() {
            "" => format!("Child {}", index + 1),
            first => first.to_string(),
        };
        documents.push(RequiredDocument::fixed(
            DocumentKind::BirthCertificate { child: index },
            &format!("Birth Certificate - {name}"),
            "Birth certificate or passport",
        ));
        documents.push(RequiredDocument::fixed(
            DocumentKind::Immunization { child: index },
            &format!("Immunization Records - {name}"),
            "Immunization records",
        ));
    }

    if children.iter().any(|child| child.special_needs) {
        documents.push(RequiredDocument {
            kind: DocumentKind::SpecialNeedsDocumentation,
            label: "Special Needs Documentation".to_string(),
            description: "Medical or educational documentation",
            conditional: true,
        });
    }

    documents
}

/// Required documents with a matching upload, out of all required documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProgress {
    pub satisfied: usize,
    pub required: usize,
}

impl DocumentProgress {
    pub fn ratio(&self) -> f64 {
        if self.required == 0 {
            return 1.0;
        }
        self.satisfied as f64 / self.required as f64
    }

    pub fn is_complete(&self) -> bool {
        self.satisfied == self.required
    }
}

pub fn document_progress(draft: &ApplicationDraft) -> DocumentProgress {
    let required = required_documents(draft.employment.status, &draft.children);
    let satisfied = required
        .iter()
        .filter(|requirement| draft.document(requirement.kind).is_some())
        .count();

    DocumentProgress {
        satisfied,
        required: required.len(),
    }
}

/// Which optional employment sections the presentation layer should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionVisibility {
    pub employer_details: bool,
    pub work_schedule: bool,
}

pub fn section_visibility(status: Option<EmploymentStatus>) -> SectionVisibility {
    SectionVisibility {
        employer_details: status.is_some_and(EmploymentStatus::has_employer),
        work_schedule: status.is_some_and(EmploymentStatus::is_working),
    }
}
