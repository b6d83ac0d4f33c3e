use super::common::*;
use crate::workflows::subsidy::applications::domain::{DocumentKind, EmploymentStatus, Household};
use crate::workflows::subsidy::applications::eligibility::{
    assess_household, document_progress, poverty_level_percentage, required_documents,
};
use crate::workflows::subsidy::applications::review::{ReviewSection, ReviewSummary};

#[test]
fn family_of_four_at_the_guideline_is_one_hundred_percent() {
    let program = program();
    assert_eq!(poverty_level_percentage(&program, 4, 2600.0), Some(100));
    assert_eq!(poverty_level_percentage(&program, 4, 5200.0), Some(200));
}

#[test]
fn assessment_compares_against_the_ceiling() {
    let program = program();
    let household = Household {
        size: Some(4),
        monthly_income: Some(5300.0),
        ..Household::default()
    };

    let assessment = assess_household(&program, &household).expect("inputs present");
    assert_eq!(assessment.fpl_percentage, 204);
    assert_eq!(assessment.ceiling, 200);
    assert!(!assessment.within_ceiling);

    let missing_income = Household {
        size: Some(4),
        ..Household::default()
    };
    assert_eq!(assess_household(&program, &missing_income), None);
}

#[test]
fn unemployed_parent_with_two_children_needs_seven_documents() {
    let children = vec![
        child("child-1", "Ava", "987-65-4321"),
        child("child-2", "", "987-65-4322"),
    ];

    let documents = required_documents(Some(EmploymentStatus::Unemployed), &children);
    assert_eq!(documents.len(), 7);
    assert!(documents
        .iter()
        .all(|document| document.kind != DocumentKind::EmploymentVerification));
    let labels: Vec<&str> = documents.iter().map(|document| document.label.as_str()).collect();
    assert!(labels.contains(&"Birth Certificate - Ava"));
    assert!(labels.contains(&"Immunization Records - Child 2"));

    let mut children = children;
    children[1].special_needs = true;
    let documents = required_documents(Some(EmploymentStatus::Unemployed), &children);
    assert_eq!(documents.len(), 8);
    let last = documents.last().expect("special needs entry");
    assert_eq!(last.kind, DocumentKind::SpecialNeedsDocumentation);
    assert!(last.conditional);
}

#[test]
fn working_statuses_add_employment_verification() {
    for status in [
        EmploymentStatus::FullTime,
        EmploymentStatus::PartTime,
        EmploymentStatus::SelfEmployed,
    ] {
        let documents = required_documents(Some(status), &[]);
        assert_eq!(documents.len(), 4, "{}", status.label());
        assert_eq!(documents[3].kind, DocumentKind::EmploymentVerification);
    }

    assert_eq!(
        required_documents(Some(EmploymentStatus::StudentTraining), &[]).len(),
        3
    );
    assert_eq!(required_documents(None, &[]).len(), 3);
}

#[test]
fn progress_counts_only_required_uploads() {
    let mut draft = valid_draft();
    let progress = document_progress(&draft);
    assert_eq!((progress.satisfied, progress.required), (6, 6));
    assert!(progress.is_complete());

    // Uploads that are no longer required do not count.
    draft.employment.status = Some(EmploymentStatus::Unemployed);
    draft.documents.retain(|record| record.kind != DocumentKind::ResidencyProof);
    let progress = document_progress(&draft);
    assert_eq!((progress.satisfied, progress.required), (4, 5));
    assert!((progress.ratio() - 0.8).abs() < f64::EPSILON);
}

#[test]
fn review_summary_flags_incomplete_sections() {
    let mut draft = valid_draft();
    assert!(ReviewSummary::for_draft(&draft).all_complete());

    draft.provider_selection = None;
    draft.signature.full_name.clear();
    let summary = ReviewSummary::for_draft(&draft);
    assert!(!summary.all_complete());
    assert_eq!(
        summary.incomplete().collect::<Vec<_>>(),
        vec![ReviewSection::Provider, ReviewSection::Certification]
    );
}
