use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Build the program's `APP-<year>-<sequence>` identifier.
    pub fn sequenced(year: i32, sequence: u64) -> Self {
        Self(format!("APP-{year}-{sequence:05}"))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of the application wizard, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    PersonalContact,
    Household,
    Employment,
    Children,
    Provider,
    Documents,
    Certification,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::PersonalContact,
        WizardStep::Household,
        WizardStep::Employment,
        WizardStep::Children,
        WizardStep::Provider,
        WizardStep::Documents,
        WizardStep::Certification,
        WizardStep::Review,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_review(self) -> bool {
        self == WizardStep::Review
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::PersonalContact => "Personal & Contact",
            WizardStep::Household => "Household",
            WizardStep::Employment => "Employment",
            WizardStep::Children => "Children",
            WizardStep::Provider => "Provider",
            WizardStep::Documents => "Documents",
            WizardStep::Certification => "Certification",
            WizardStep::Review => "Review & Submit",
        }
    }
}

/// Personal details for the adult applying on behalf of the household.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub ssn: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub marital_status: Option<MaritalStatus>,
    pub primary_language: Option<PrimaryLanguage>,
}

impl Applicant {
    /// "First Last" with surrounding whitespace removed; empty when neither part is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryLanguage {
    English,
    Spanish,
    Other,
}

/// Mailing address and preferred channels for the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub street_address: String,
    #[serde(default)]
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub county: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub alternate_phone: Option<String>,
    pub email: String,
    pub preferred_contact_method: Option<ContactMethod>,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            street_address: String::new(),
            apartment: None,
            city: String::new(),
            state: "OH".to_string(),
            zip_code: String::new(),
            county: None,
            phone: String::new(),
            alternate_phone: None,
            email: String::new(),
            preferred_contact_method: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactMethod {
    Email,
    Phone,
    #[serde(rename = "SMS")]
    Sms,
}

/// Household size and income as declared by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub size: Option<u8>,
    pub dependents: Option<u8>,
    pub monthly_income: Option<f64>,
    pub income_frequency: Option<IncomeFrequency>,
    pub primary_income_source: Option<IncomeSource>,
    /// Derived; recomputed whenever the household section is edited.
    #[serde(default)]
    pub fpl_percentage: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeFrequency {
    Weekly,
    #[serde(rename = "Bi-weekly")]
    BiWeekly,
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeSource {
    Employment,
    #[serde(rename = "Self-Employment")]
    SelfEmployment,
    #[serde(rename = "Unemployment Benefits")]
    UnemploymentBenefits,
    #[serde(rename = "Social Security")]
    SocialSecurity,
    #[serde(rename = "Child Support")]
    ChildSupport,
    Other,
}

/// Current employment situation; which sub-sections apply depends on `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employment {
    pub status: Option<EmploymentStatus>,
    #[serde(default)]
    pub employer_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub employer_address: EmployerAddress,
    #[serde(default)]
    pub employer_phone: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub hours_per_week: Option<u8>,
    #[serde(default)]
    pub gross_monthly_income: Option<f64>,
    #[serde(default)]
    pub schedule: Vec<WorkShift>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    #[serde(rename = "Student/Training")]
    StudentTraining,
    Unemployed,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 5] = [
        EmploymentStatus::FullTime,
        EmploymentStatus::PartTime,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::StudentTraining,
        EmploymentStatus::Unemployed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::FullTime => "Full-Time",
            EmploymentStatus::PartTime => "Part-Time",
            EmploymentStatus::SelfEmployed => "Self-Employed",
            EmploymentStatus::StudentTraining => "Student/Training",
            EmploymentStatus::Unemployed => "Unemployed",
        }
    }

    /// Parse the display label (case-insensitive).
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value))
    }

    /// Employer name, address, phone and start date apply.
    pub const fn has_employer(self) -> bool {
        matches!(self, EmploymentStatus::FullTime | EmploymentStatus::PartTime)
    }

    /// Hours, income and weekly schedule apply; also drives employment verification.
    pub const fn is_working(self) -> bool {
        matches!(
            self,
            EmploymentStatus::FullTime | EmploymentStatus::PartTime | EmploymentStatus::SelfEmployed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerAddress {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
}

/// A recurring weekly shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkShift {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// One dependent needing care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub ssn: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub relationship: Option<Relationship>,
    #[serde(default)]
    pub special_needs: bool,
    #[serde(default)]
    pub special_needs_description: String,
    #[serde(default)]
    pub care_needed: BTreeSet<CareType>,
    pub preferred_start_date: Option<NaiveDate>,
}

impl Child {
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            middle_initial: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            ssn: String::new(),
            gender: None,
            relationship: None,
            special_needs: false,
            special_needs_description: String::new(),
            care_needed: BTreeSet::new(),
            preferred_start_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    Child,
    Stepchild,
    Grandchild,
    #[serde(rename = "Foster Child")]
    FosterChild,
    #[serde(rename = "Legal Ward")]
    LegalWard,
    Other,
}

/// Schedule pattern a child needs care for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CareType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Before School")]
    BeforeSchool,
    #[serde(rename = "After School")]
    AfterSchool,
    Weekends,
}

/// Provider details copied into the draft when the parent picks a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    pub provider_id: String,
    pub provider_name: String,
    pub provider_license: String,
    pub provider_address: String,
    pub provider_phone: String,
}

/// Tag identifying what an uploaded file proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    IncomeProof,
    IdentityDocument,
    ResidencyProof,
    EmploymentVerification,
    BirthCertificate { child: usize },
    Immunization { child: usize },
    SpecialNeedsDocumentation,
}

impl DocumentKind {
    /// Stable code used in upload forms and stored records.
    pub fn code(self) -> String {
        match self {
            DocumentKind::IncomeProof => "income_proof".to_string(),
            DocumentKind::IdentityDocument => "identity_document".to_string(),
            DocumentKind::ResidencyProof => "residency_proof".to_string(),
            DocumentKind::EmploymentVerification => "employment_verification".to_string(),
            DocumentKind::BirthCertificate { child } => format!("birth_certificate_{child}"),
            DocumentKind::Immunization { child } => format!("immunization_{child}"),
            DocumentKind::SpecialNeedsDocumentation => "special_needs_documentation".to_string(),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        let fixed = match code {
            "income_proof" => Some(DocumentKind::IncomeProof),
            "identity_document" => Some(DocumentKind::IdentityDocument),
            "residency_proof" => Some(DocumentKind::ResidencyProof),
            "employment_verification" => Some(DocumentKind::EmploymentVerification),
            "special_needs_documentation" => Some(DocumentKind::SpecialNeedsDocumentation),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }

        if let Some(index) = code.strip_prefix("birth_certificate_") {
            return index
                .parse()
                .ok()
                .map(|child| DocumentKind::BirthCertificate { child });
        }
        code.strip_prefix("immunization_")
            .and_then(|index| index.parse().ok())
            .map(|child| DocumentKind::Immunization { child })
    }
}

/// Metadata for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub kind: DocumentKind,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// Acknowledgements the applicant must accept before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Certification {
    Accuracy,
    VerificationPermission,
    FraudUnderstanding,
    ProgramRules,
}

impl Certification {
    pub const ALL: [Certification; 4] = [
        Certification::Accuracy,
        Certification::VerificationPermission,
        Certification::FraudUnderstanding,
        Certification::ProgramRules,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Certification::Accuracy => "accuracy",
            Certification::VerificationPermission => "verification_permission",
            Certification::FraudUnderstanding => "fraud_understanding",
            Certification::ProgramRules => "program_rules",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Certification::Accuracy => "Accuracy Certification",
            Certification::VerificationPermission => "Verification Permission",
            Certification::FraudUnderstanding => "Fraud Understanding",
            Certification::ProgramRules => "Program Rules Agreement",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certifications {
    pub accuracy: bool,
    pub verification_permission: bool,
    pub fraud_understanding: bool,
    pub program_rules: bool,
}

impl Certifications {
    pub fn all_acknowledged() -> Self {
        Self {
            accuracy: true,
            verification_permission: true,
            fraud_understanding: true,
            program_rules: true,
        }
    }

    pub fn is_acknowledged(&self, certification: Certification) -> bool {
        match certification {
            Certification::Accuracy => self.accuracy,
            Certification::VerificationPermission => self.verification_permission,
            Certification::FraudUnderstanding => self.fraud_understanding,
            Certification::ProgramRules => self.program_rules,
        }
    }
}

/// Typed electronic signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub full_name: String,
    pub date: Option<NaiveDate>,
}

/// The working, not-yet-submitted application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub applicant: Applicant,
    pub contact: Contact,
    pub household: Household,
    pub employment: Employment,
    pub children: Vec<Child>,
    pub provider_selection: Option<ProviderSelection>,
    pub documents: Vec<DocumentRecord>,
    pub certifications: Certifications,
    pub signature: Signature,
    pub current_step: WizardStep,
    pub created_at: DateTime<Utc>,
    pub last_saved: Option<DateTime<Utc>>,
}

impl ApplicationDraft {
    /// Fresh draft positioned on the first step with one blank child entry.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            applicant: Applicant::default(),
            contact: Contact::default(),
            household: Household::default(),
            employment: Employment::default(),
            children: vec![Child::blank("child-1")],
            provider_selection: None,
            documents: Vec::new(),
            certifications: Certifications::default(),
            signature: Signature::default(),
            current_step: WizardStep::PersonalContact,
            created_at,
            last_saved: None,
        }
    }

    /// Shallow merge: every section present in the patch replaces the draft's section.
    pub fn merge(&mut self, patch: DraftPatch) {
        let DraftPatch {
            applicant,
            contact,
            household,
            employment,
            children,
            provider_selection,
            documents,
            certifications,
            signature,
        } = patch;

        if let Some(applicant) = applicant {
            self.applicant = applicant;
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        if let Some(household) = household {
            self.household = household;
        }
        if let Some(employment) = employment {
            self.employment = employment;
        }
        if let Some(children) = children {
            self.children = children;
        }
        if let Some(selection) = provider_selection {
            self.provider_selection = Some(selection);
        }
        if let Some(documents) = documents {
            self.documents = documents;
        }
        if let Some(certifications) = certifications {
            self.certifications = certifications;
        }
        if let Some(signature) = signature {
            self.signature = signature;
        }
    }

    pub fn document(&self, kind: DocumentKind) -> Option<&DocumentRecord> {
        self.documents.iter().find(|record| record.kind == kind)
    }
}

/// Partial update applied by `DraftWizard::edit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub applicant: Option<Applicant>,
    pub contact: Option<Contact>,
    pub household: Option<Household>,
    pub employment: Option<Employment>,
    pub children: Option<Vec<Child>>,
    pub provider_selection: Option<ProviderSelection>,
    pub documents: Option<Vec<DocumentRecord>>,
    pub certifications: Option<Certifications>,
    pub signature: Option<Signature>,
}

impl DraftPatch {
    pub fn applicant(applicant: Applicant) -> Self {
        Self {
            applicant: Some(applicant),
            ..Self::default()
        }
    }

    pub fn contact(contact: Contact) -> Self {
        Self {
            contact: Some(contact),
            ..Self::default()
        }
    }

    pub fn household(household: Household) -> Self {
        Self {
            household: Some(household),
            ..Self::default()
        }
    }

    pub fn employment(employment: Employment) -> Self {
        Self {
            employment: Some(employment),
            ..Self::default()
        }
    }

    pub fn children(children: Vec<Child>) -> Self {
        Self {
            children: Some(children),
            ..Self::default()
        }
    }

    pub fn provider_selection(selection: ProviderSelection) -> Self {
        Self {
            provider_selection: Some(selection),
            ..Self::default()
        }
    }

    pub fn documents(documents: Vec<DocumentRecord>) -> Self {
        Self {
            documents: Some(documents),
            ..Self::default()
        }
    }

    pub fn certifications(certifications: Certifications) -> Self {
        Self {
            certifications: Some(certifications),
            ..Self::default()
        }
    }

    pub fn signature(signature: Signature) -> Self {
        Self {
            signature: Some(signature),
            ..Self::default()
        }
    }

    pub fn touches_household(&self) -> bool {
        self.household.is_some()
    }
}

/// Status tracked for a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    InfoRequested,
    PendingApproval,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::InfoRequested => "info_requested",
            ApplicationStatus::PendingApproval => "pending_approval",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }
}

/// One line of the append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: String,
    pub performed_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Record produced from a draft at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedApplication {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub application: ApplicationDraft,
    pub history: Vec<HistoryEntry>,
}

impl SubmittedApplication {
    pub(crate) fn from_draft(
        id: ApplicationId,
        application: ApplicationDraft,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let performed_by = match application.applicant.full_name() {
            name if name.is_empty() => "Applicant".to_string(),
            name => name,
        };

        Self {
            id,
            status: ApplicationStatus::Submitted,
            submitted_at,
            application,
            history: vec![HistoryEntry {
                action: "Application Submitted".to_string(),
                performed_by,
                timestamp: submitted_at,
            }],
        }
    }

    /// Move to `status`, appending a history entry.
    pub fn record_status_change(
        &mut self,
        status: ApplicationStatus,
        performed_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), StatusChangeError> {
        if self.status.is_terminal() {
            return Err(StatusChangeError::Finalized(self.status));
        }
        if self.status == status {
            return Err(StatusChangeError::Unchanged(status));
        }

        self.status = status;
        self.history.push(HistoryEntry {
            action: format!("Status changed to {}", status.label()),
            performed_by: performed_by.into(),
            timestamp: at,
        });
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StatusChangeError {
    #[error("application is already {} and cannot change status", .0.label())]
    Finalized(ApplicationStatus),
    #[error("application is already {}", .0.label())]
    Unchanged(ApplicationStatus),
}
