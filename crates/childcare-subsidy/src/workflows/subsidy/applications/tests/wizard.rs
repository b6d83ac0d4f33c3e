use chrono::Duration;

use super::common::*;
use crate::workflows::subsidy::applications::domain::{
    ApplicationDraft, DocumentKind, DraftPatch, Household, VerificationStatus, WizardStep,
};
use crate::workflows::subsidy::applications::repository::SnapshotStore;
use crate::workflows::subsidy::applications::snapshot::MemorySnapshotStore;
use crate::workflows::subsidy::applications::wizard::{StepOutcome, WizardError};

#[test]
fn start_seeds_a_blank_child_and_persists() {
    let mut h = harness();
    let draft = h.wizard.start().expect("start").clone();

    assert_eq!(draft.current_step, WizardStep::PersonalContact);
    assert_eq!(draft.children.len(), 1);
    assert_eq!(draft.children[0].id, "child-1");
    assert_eq!(draft.contact.state, "OH");

    let stored = h
        .snapshots
        .load_snapshot()
        .expect("load")
        .expect("snapshot written on start");
    assert_eq!(stored, draft);
}

#[test]
fn operations_require_an_open_draft() {
    let mut h = harness();
    assert!(matches!(h.wizard.next(), Err(WizardError::NoActiveDraft)));
    assert!(matches!(h.wizard.back(), Err(WizardError::NoActiveDraft)));
    assert!(matches!(
        h.wizard.edit(DraftPatch::default()),
        Err(WizardError::NoActiveDraft)
    ));
    assert!(matches!(h.wizard.submit(), Err(WizardError::NoActiveDraft)));

    h.wizard.start().expect("start");
    assert!(matches!(h.wizard.start(), Err(WizardError::DraftInProgress)));
    assert!(matches!(h.wizard.resume(), Err(WizardError::DraftInProgress)));
}

#[test]
fn next_is_blocked_until_the_step_validates() {
    let mut h = harness();
    h.wizard.start().expect("start");

    match h.wizard.next().expect("next") {
        StepOutcome::Blocked { step, errors } => {
            assert_eq!(step, WizardStep::PersonalContact);
            assert!(errors.contains("applicant.first_name"));
        }
        other => panic!("expected blocked outcome, got {other:?}"),
    }
    assert_eq!(h.wizard.current_step(), Some(WizardStep::PersonalContact));
    assert!(!h.wizard.errors().expect("editing").is_empty());

    let valid = valid_draft();
    h.wizard
        .edit(DraftPatch {
            applicant: Some(valid.applicant),
            contact: Some(valid.contact),
            ..DraftPatch::default()
        })
        .expect("edit");

    assert_eq!(
        h.wizard.next().expect("next"),
        StepOutcome::Advanced {
            from: WizardStep::PersonalContact,
            to: WizardStep::Household,
        }
    );
    assert!(h.wizard.errors().expect("editing").is_empty());
    let stored = h.snapshots.load_snapshot().expect("load").expect("stored");
    assert_eq!(stored.current_step, WizardStep::Household);
}

#[test]
fn back_saturates_at_the_first_step_and_clears_errors() {
    let mut h = harness();
    h.wizard.start().expect("start");
    h.wizard.next().expect("blocked next");
    assert!(!h.wizard.errors().expect("editing").is_empty());

    assert_eq!(h.wizard.back().expect("back"), WizardStep::PersonalContact);
    assert!(h.wizard.errors().expect("editing").is_empty());

    h.wizard.edit(full_patch(valid_draft())).expect("edit");
    h.wizard.next().expect("advance");
    h.wizard.next().expect("advance");
    assert_eq!(h.wizard.current_step(), Some(WizardStep::Employment));

    // Back never re-validates the step being left.
    h.wizard
        .edit(DraftPatch::household(Household::default()))
        .expect("edit");
    assert_eq!(h.wizard.back().expect("back"), WizardStep::Household);
    assert_eq!(h.wizard.back().expect("back"), WizardStep::PersonalContact);
    assert_eq!(h.wizard.back().expect("back"), WizardStep::PersonalContact);
}

#[test]
fn repeating_an_edit_only_moves_last_saved() {
    let mut h = harness();
    h.wizard.start().expect("start");
    let patch = full_patch(valid_draft());

    let first = h.wizard.edit(patch.clone()).expect("edit").clone();
    h.clock.advance(Duration::minutes(5));
    let second = h.wizard.edit(patch).expect("edit").clone();

    assert_ne!(first.last_saved, second.last_saved);
    assert_eq!(
        ApplicationDraft {
            last_saved: None,
            ..first
        },
        ApplicationDraft {
            last_saved: None,
            ..second
        }
    );
}

#[test]
fn household_edits_recompute_the_poverty_percentage() {
    let mut h = harness();
    h.wizard.start().expect("start");

    let draft = h
        .wizard
        .edit(DraftPatch::household(Household {
            size: Some(4),
            monthly_income: Some(2600.0),
            ..Household::default()
        }))
        .expect("edit");
    assert_eq!(draft.household.fpl_percentage, Some(100));

    let draft = h
        .wizard
        .edit(DraftPatch::household(Household {
            size: Some(4),
            monthly_income: None,
            fpl_percentage: Some(55),
            ..Household::default()
        }))
        .expect("edit");
    assert_eq!(draft.household.fpl_percentage, None);

    let assessment = h.wizard.eligibility().expect("editing");
    assert_eq!(assessment, None);
}

#[test]
fn malformed_snapshot_is_treated_as_absent() {
    let mut h = harness_with(MemorySnapshotStore::with_raw("{\"applicant\": 42"));
    assert!(h.wizard.resume().expect("resume").is_none());
    assert!(h.wizard.draft().is_none());

    let draft = h.wizard.open().expect("open starts fresh");
    assert_eq!(draft.current_step, WizardStep::PersonalContact);
}

#[test]
fn resume_restores_the_saved_step() {
    let mut saved = valid_draft();
    saved.current_step = WizardStep::Documents;
    let raw = serde_json::to_string(&saved).expect("encode");

    let mut h = harness_with(MemorySnapshotStore::with_raw(raw));
    let resumed = h.wizard.resume().expect("resume").expect("stored draft");
    assert_eq!(resumed, &saved);
    assert_eq!(h.wizard.current_step(), Some(WizardStep::Documents));
}

#[test]
fn children_stay_within_one_to_four() {
    let mut h = harness();
    h.wizard.start().expect("start");

    assert!(matches!(h.wizard.remove_child(0), Err(WizardError::LastChild)));
    for expected in 1..4 {
        assert_eq!(h.wizard.add_child().expect("add child"), expected);
    }
    assert!(matches!(
        h.wizard.add_child(),
        Err(WizardError::TooManyChildren { max: 4 })
    ));
    assert!(matches!(
        h.wizard.remove_child(7),
        Err(WizardError::ChildIndex { index: 7, len: 4 })
    ));

    let ids: Vec<String> = h
        .wizard
        .draft()
        .expect("draft")
        .children
        .iter()
        .map(|child| child.id.clone())
        .collect();
    assert_eq!(ids, vec!["child-1", "child-2", "child-3", "child-4"]);

    let too_many = vec![child("a", "A", ""); 5];
    assert!(matches!(
        h.wizard.edit(DraftPatch::children(too_many)),
        Err(WizardError::TooManyChildren { max: 4 })
    ));
}

#[test]
fn removing_a_child_reindexes_its_siblings_documents() {
    let mut h = harness();
    h.wizard.start().expect("start");
    h.wizard.add_child().expect("second child");
    h.wizard.add_child().expect("third child");

    for child in 0..3 {
        let errors = h
            .wizard
            .register_upload(
                DocumentKind::BirthCertificate { child },
                &format!("birth-{child}.pdf"),
                1024,
                "application/pdf",
            )
            .expect("upload");
        assert!(errors.is_empty());
    }

    h.wizard.remove_child(1).expect("remove middle child");
    let draft = h.wizard.draft().expect("draft");
    assert_eq!(draft.children.len(), 2);
    assert_eq!(
        draft
            .document(DocumentKind::BirthCertificate { child: 1 })
            .map(|record| record.name.as_str()),
        Some("birth-2.pdf")
    );
    assert!(draft
        .document(DocumentKind::BirthCertificate { child: 2 })
        .is_none());
}

#[test]
fn reordering_children_keeps_each_childs_uploads() {
    let mut h = harness();
    h.wizard.start().expect("start");
    h.wizard.add_child().expect("second child");

    for child in 0..2 {
        h.wizard
            .register_upload(
                DocumentKind::Immunization { child },
                &format!("shots-{child}.pdf"),
                1024,
                "application/pdf",
            )
            .expect("upload");
    }

    let mut children = h.wizard.draft().expect("draft").children.clone();
    children.reverse();
    h.wizard
        .edit(DraftPatch::children(children))
        .expect("reorder");

    let draft = h.wizard.draft().expect("draft");
    assert_eq!(draft.children[0].id, "child-2");
    let name = |child| {
        draft
            .document(DocumentKind::Immunization { child })
            .map(|record| record.name.as_str())
    };
    assert_eq!(name(0), Some("shots-1.pdf"));
    assert_eq!(name(1), Some("shots-0.pdf"));

    let stored = h.snapshots.load_snapshot().expect("load").expect("stored");
    assert_eq!(&stored, draft);
}

#[test]
fn clearing_the_provider_resets_the_selection() {
    let mut h = harness();
    h.wizard.start().expect("start");
    assert!(!h.wizard.clear_provider().expect("nothing selected"));

    h.wizard.select_provider("PRV-001").expect("select");
    assert!(h.wizard.clear_provider().expect("clear"));
    assert!(h.wizard.draft().expect("draft").provider_selection.is_none());

    let stored = h.snapshots.load_snapshot().expect("load").expect("stored");
    assert!(stored.provider_selection.is_none());
}

#[test]
fn select_provider_copies_directory_details() {
    let mut h = harness();
    h.wizard.start().expect("start");

    let errors = h.wizard.select_provider("PRV-999").expect("lookup");
    assert_eq!(
        errors.get("provider_selection.provider_id"),
        Some("Selected provider was not found")
    );
    assert!(h.wizard.draft().expect("draft").provider_selection.is_none());

    let errors = h.wizard.select_provider("PRV-001").expect("lookup");
    assert!(errors.is_empty());
    let selection = h
        .wizard
        .draft()
        .expect("draft")
        .provider_selection
        .clone()
        .expect("selected");
    assert_eq!(selection.provider_name, "Sunshine Learning Center");
    assert_eq!(selection.provider_license, "OH-CC-001");
    assert_eq!(selection.provider_address, "100 Main St, Columbus, OH 43215");
}

#[test]
fn uploads_replace_same_kind_and_reject_bad_files() {
    let mut h = harness();
    h.wizard.start().expect("start");

    let errors = h
        .wizard
        .register_upload(DocumentKind::IncomeProof, "notes.txt", 100, "text/plain")
        .expect("upload");
    assert_eq!(
        errors.get("documents"),
        Some("File type not supported. Please upload PDF, JPG, or PNG files.")
    );

    let errors = h
        .wizard
        .register_upload(
            DocumentKind::IncomeProof,
            "scan.png",
            11 * 1024 * 1024,
            "image/png",
        )
        .expect("upload");
    assert_eq!(errors.get("documents"), Some("File size exceeds 10MB limit"));
    assert!(h.wizard.draft().expect("draft").documents.is_empty());

    h.wizard
        .register_upload(DocumentKind::IncomeProof, "march.pdf", 2048, "application/pdf")
        .expect("upload");
    h.clock.advance(Duration::seconds(30));
    h.wizard
        .register_upload(DocumentKind::IncomeProof, "april.jpg", 4096, "image/jpeg")
        .expect("upload");

    let draft = h.wizard.draft().expect("draft");
    assert_eq!(draft.documents.len(), 1);
    let record = draft.document(DocumentKind::IncomeProof).expect("kept");
    assert_eq!(record.name, "april.jpg");
    assert_eq!(record.status, VerificationStatus::Pending);
    assert_eq!(record.uploaded_at, now() + Duration::seconds(30));

    assert!(h
        .wizard
        .remove_document(DocumentKind::IncomeProof)
        .expect("remove"));
    assert!(!h
        .wizard
        .remove_document(DocumentKind::IncomeProof)
        .expect("remove"));
    assert_eq!(h.wizard.document_progress().expect("progress").satisfied, 0);
}

#[test]
fn discard_clears_the_snapshot() {
    let mut h = harness();
    h.wizard.start().expect("start");
    assert!(!h.snapshots.is_empty());

    h.wizard.discard().expect("discard");
    assert!(h.snapshots.is_empty());
    assert!(h.wizard.draft().is_none());
    assert!(h.records.records().is_empty());

    h.wizard.start().expect("a new draft may be started");
}
