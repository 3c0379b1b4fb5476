//! Course applications: submission, admin review, filters and counts.
//!
//! Submissions are validated here before they reach the store. Review actions
//! (`set_status`, `delete`) work on any reviewable collection. They and
//! submissions report back through a [`Notice`];
//! store failures are logged and turned into an error notice instead of
//! bubbling up to the page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, OffsetDateTime};
use tracing::{error, info, warn};

use super::stats::Category;
use super::store::{Collection, Document, DocumentStore, StoreError};
use super::{Notice, matches_search};

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;
const AGE_RANGE: std::ops::RangeInclusive<u32> = 16..=65;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationType {
    #[default]
    Basic,
    Full,
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Full => "full",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "قيد المراجعة",
            Self::Approved => "مقبول",
            Self::Rejected => "مرفوض",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored course application. `id` comes from the document key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(skip)]
    pub id: String,
    pub full_name: String,
    pub age: u32,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub wilaya: String,
    pub education: String,
    pub course: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub registration_type: RegistrationType,
    #[serde(with = "time::serde::rfc3339")]
    pub submission_date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub agreed_to_contract: bool,
    /// Signature image as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_front_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_back_url: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

/// What the registration page collects before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub age: u32,
    pub phone: String,
    pub email: Option<String>,
    pub wilaya: String,
    pub education: String,
    pub course: String,
    pub experience: Option<String>,
    pub comments: Option<String>,
    pub registration_type: RegistrationType,
    pub payment_method: Option<String>,
    pub agreed_to_contract: bool,
    pub signature: Option<String>,
    pub payment_proof_url: Option<String>,
    pub id_front_url: Option<String>,
    pub id_back_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("full name is required")]
    MissingName,
    #[error("phone must hold 8-15 digits: {0}")]
    InvalidPhone(String),
    #[error("age must be between 16 and 65, got {0}")]
    AgeOutOfRange(u32),
    #[error("no wilaya selected")]
    MissingWilaya,
    #[error("no education level selected")]
    MissingEducation,
    #[error("no course selected")]
    MissingCourse,
    #[error("full registration requires {0}")]
    MissingDocument(RequiredDocument),
    #[error("full registration requires a payment method")]
    MissingPaymentMethod,
    #[error("full registration requires agreeing to the contract")]
    ContractNotAccepted,
    #[error("submission must be a JSON object with a full name")]
    MalformedEntry,
}

impl ValidationError {
    pub(crate) fn message(&self) -> &'static str {
        match self {
            Self::MissingName => "يرجى إدخال الاسم الكامل",
            Self::InvalidPhone(_) => "رقم الهاتف غير صالح",
            Self::AgeOutOfRange(_) => "العمر يجب أن يكون بين 16 و 65",
            Self::MissingWilaya => "يرجى اختيار الولاية",
            Self::MissingEducation => "يرجى اختيار المستوى التعليمي",
            Self::MissingCourse => "يرجى اختيار الدورة",
            Self::MissingDocument(RequiredDocument::IdFront) => "يرجى إرفاق صورة بطاقة الهوية (الوجه الأمامي)",
            Self::MissingDocument(RequiredDocument::IdBack) => "يرجى إرفاق صورة بطاقة الهوية (الوجه الخلفي)",
            Self::MissingDocument(RequiredDocument::PaymentProof) => "يرجى إرفاق إثبات الدفع",
            Self::MissingPaymentMethod => "يرجى اختيار طريقة الدفع",
            Self::ContractNotAccepted => "يجب الموافقة على العقد",
            Self::MalformedEntry => "بيانات الطلب غير مكتملة",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("timestamp out of range: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("{0:?} submissions go through their own form")]
    UnsupportedCategory(Category),
}

impl From<&SubmitError> for Notice {
    fn from(err: &SubmitError) -> Self {
        match err {
            SubmitError::Validation(invalid) => Self::error(invalid.message()),
            SubmitError::Store(_) | SubmitError::Timestamp(_) | SubmitError::UnsupportedCategory(_) => {
                Self::error("حدث خطأ أثناء الإرسال. يرجى المحاولة مرة أخرى.")
            }
        }
    }
}

/// Uploads a full registration must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredDocument {
    IdFront,
    IdBack,
    PaymentProof,
}

impl fmt::Display for RequiredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IdFront => "an ID card front image",
            Self::IdBack => "an ID card back image",
            Self::PaymentProof => "a payment proof",
        })
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let valid = digits.chars().all(|c| c.is_ascii_digit())
        && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len());
    if valid { Ok(()) } else { Err(ValidationError::InvalidPhone(phone.to_owned())) }
}

impl RegistrationForm {
    /// # Errors
    ///
    /// Returns the first rule the form breaks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        validate_phone(&self.phone)?;
        if !AGE_RANGE.contains(&self.age) {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }
        if is_blank(Some(self.wilaya.as_str())) {
            return Err(ValidationError::MissingWilaya);
        }
        if is_blank(Some(self.education.as_str())) {
            return Err(ValidationError::MissingEducation);
        }
        if is_blank(Some(self.course.as_str())) {
            return Err(ValidationError::MissingCourse);
        }
        if self.registration_type == RegistrationType::Full {
            if is_blank(self.id_front_url.as_deref()) {
                return Err(ValidationError::MissingDocument(RequiredDocument::IdFront));
            }
            if is_blank(self.id_back_url.as_deref()) {
                return Err(ValidationError::MissingDocument(RequiredDocument::IdBack));
            }
            if is_blank(self.payment_method.as_deref()) {
                return Err(ValidationError::MissingPaymentMethod);
            }
            if is_blank(self.payment_proof_url.as_deref()) {
                return Err(ValidationError::MissingDocument(RequiredDocument::PaymentProof));
            }
            if !self.agreed_to_contract {
                return Err(ValidationError::ContractNotAccepted);
            }
        }
        Ok(())
    }

    fn into_application(self, submitted_at: OffsetDateTime) -> Application {
        Application {
            id: String::new(),
            full_name: self.full_name.trim().to_owned(),
            age: self.age,
            phone: self.phone.trim().to_owned(),
            email: self.email,
            wilaya: self.wilaya,
            education: self.education,
            course: self.course,
            experience: self.experience,
            comments: self.comments,
            registration_type: self.registration_type,
            submission_date: submitted_at,
            payment_method: self.payment_method,
            agreed_to_contract: self.agreed_to_contract,
            signature: self.signature,
            payment_proof_url: self.payment_proof_url,
            id_front_url: self.id_front_url,
            id_back_url: self.id_back_url,
            status: ApplicationStatus::Pending,
        }
    }
}

/// Validate and store a course application. Returns the new document id.
///
/// # Errors
///
/// [`SubmitError::Validation`] leaves the store untouched.
pub async fn create_application(
    store: &dyn DocumentStore,
    form: RegistrationForm,
    submitted_at: OffsetDateTime,
) -> Result<String, SubmitError> {
    form.validate()?;
    let application = form.into_application(submitted_at);
    let data = serde_json::to_value(&application).map_err(StoreError::from)?;
    let id = store.create(Collection::Applications, data).await?;
    info!(%id, course = %application.course, kind = ?application.registration_type, "application submitted");
    Ok(id)
}

/// Submit from the registration page and report the outcome.
pub async fn submit(store: &dyn DocumentStore, form: RegistrationForm, submitted_at: OffsetDateTime) -> Notice {
    match create_application(store, form, submitted_at).await {
        Ok(_) => Notice::success("تم إرسال التسجيل بنجاح! سنتواصل معك قريباً."),
        Err(err) => {
            match &err {
                SubmitError::Validation(invalid) => warn!(error = %invalid, "application rejected"),
                failure => error!(error = %failure, "application submit failed"),
            }
            Notice::from(&err)
        }
    }
}

/// Decode stored applications, newest first. Undecodable documents are skipped.
#[must_use]
pub fn decode_applications(docs: &[Document]) -> Vec<Application> {
    let mut apps: Vec<Application> = docs
        .iter()
        .filter_map(|doc| match serde_json::from_value::<Application>(doc.data.clone()) {
            Ok(mut app) => {
                app.id.clone_from(&doc.id);
                Some(app)
            }
            Err(err) => {
                warn!(id = %doc.id, error = %err, "skipping malformed application");
                None
            }
        })
        .collect();
    apps.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
    apps
}

pub async fn load_applications(store: &dyn DocumentStore) -> Result<Vec<Application>, StoreError> {
    let docs = store.list(Collection::Applications).await?;
    Ok(decode_applications(&docs))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter: {0}")]
pub struct ParseFilterError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, status: ApplicationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Only(ApplicationStatus::Pending)),
            "approved" => Ok(Self::Only(ApplicationStatus::Approved)),
            "rejected" => Ok(Self::Only(ApplicationStatus::Rejected)),
            other => Err(ParseFilterError(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(RegistrationType),
}

impl TypeFilter {
    #[must_use]
    pub fn matches(self, kind: RegistrationType) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == kind,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "basic" => Ok(Self::Only(RegistrationType::Basic)),
            "full" => Ok(Self::Only(RegistrationType::Full)),
            other => Err(ParseFilterError(other.to_owned())),
        }
    }
}

/// Applications passing every filter, in input order. `search` matches name,
/// phone or email.
#[must_use]
pub fn filter<'a>(
    apps: &'a [Application],
    status: StatusFilter,
    kind: TypeFilter,
    search: &str,
) -> Vec<&'a Application> {
    apps.iter()
        .filter(|app| status.matches(app.status) && kind.matches(app.registration_type))
        .filter(|app| matches_search(search, &app.full_name, &app.phone, app.email.as_deref()))
        .collect()
}

/// Dashboard header counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub basic: usize,
    pub full: usize,
    pub this_month: usize,
}

/// Count applications; "this month" is the calendar month containing `today`.
#[must_use]
pub fn counts(apps: &[Application], today: Date) -> ApplicationCounts {
    let mut out = ApplicationCounts { total: apps.len(), ..ApplicationCounts::default() };
    for app in apps {
        match app.status {
            ApplicationStatus::Pending => out.pending += 1,
            ApplicationStatus::Approved => out.approved += 1,
            ApplicationStatus::Rejected => out.rejected += 1,
        }
        match app.registration_type {
            RegistrationType::Basic => out.basic += 1,
            RegistrationType::Full => out.full += 1,
        }
        let submitted = app.submission_date.date();
        if submitted.year() == today.year() && submitted.month() == today.month() {
            out.this_month += 1;
        }
    }
    out
}

/// Change the review status of a submission in `collection`.
pub async fn set_status(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    status: ApplicationStatus,
) -> Notice {
    match store.update(collection, id, json!({ "status": status })).await {
        Ok(()) => {
            info!(collection = collection.name(), id, %status, "status updated");
            Notice::success("تم تحديث حالة الطلب بنجاح")
        }
        Err(err) => {
            error!(collection = collection.name(), id, %status, error = %err, "status update failed");
            Notice::error("حدث خطأ أثناء تحديث الحالة")
        }
    }
}

pub async fn delete(store: &dyn DocumentStore, collection: Collection, id: &str) -> Notice {
    match store.delete(collection, id).await {
        Ok(()) => {
            info!(collection = collection.name(), id, "submission deleted");
            Notice::success("تم حذف الطلب بنجاح")
        }
        Err(err) => {
            error!(collection = collection.name(), id, error = %err, "delete failed");
            Notice::error("حدث خطأ أثناء الحذف")
        }
    }
}

#[cfg(test)]
#[path = "applications_test.rs"]
mod tests;
