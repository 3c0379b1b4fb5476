//! Club, job and internship submissions.
//!
//! These forms store loosely shaped documents: a name, contact details, a
//! review status and whatever the page collects. [`Entry`] keeps the fields
//! the admin lists filter on and the raw document for the rest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use super::applications::{ApplicationStatus, ParseFilterError, StatusFilter, SubmitError, ValidationError};
use super::matches_search;
use super::stats::Category;
use super::store::{Document, DocumentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Teacher,
    Staff,
}

impl JobType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Teacher => "أستاذ",
            Self::Staff => "موظف",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Teacher => "teacher",
            Self::Staff => "staff",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobTypeFilter {
    #[default]
    All,
    Only(JobType),
}

impl JobTypeFilter {
    #[must_use]
    pub fn matches(self, job_type: Option<JobType>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => job_type == Some(wanted),
        }
    }
}

impl FromStr for JobTypeFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "teacher" => Ok(Self::Only(JobType::Teacher)),
            "staff" => Ok(Self::Only(JobType::Staff)),
            other => Err(ParseFilterError(other.to_owned())),
        }
    }
}

/// One stored club, job or internship submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub category: Category,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub status: ApplicationStatus,
    /// Only job applications carry one.
    pub job_type: Option<JobType>,
    /// `None` when the date field is missing or unparseable.
    pub submitted_at: Option<OffsetDateTime>,
    pub data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryFields {
    full_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    status: ApplicationStatus,
    #[serde(default)]
    job_type: Option<JobType>,
}

/// Store a club, job or internship submission as pending.
///
/// `data` must be an object with a non-empty `fullName`. The category's date
/// field is stamped with `submitted_at`.
///
/// # Errors
///
/// [`ValidationError::MalformedEntry`] when `data` lacks a name, and
/// [`SubmitError::UnsupportedCategory`] for courses and workshops.
pub async fn submit_entry(
    store: &dyn DocumentStore,
    category: Category,
    mut data: Value,
    submitted_at: OffsetDateTime,
) -> Result<String, SubmitError> {
    if !matches!(category, Category::Clubs | Category::Jobs | Category::Interns) {
        return Err(SubmitError::UnsupportedCategory(category));
    }
    let named = data
        .get("fullName")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    let Some(fields) = data.as_object_mut().filter(|_| named) else {
        return Err(ValidationError::MalformedEntry.into());
    };
    let stamp = submitted_at.format(&Rfc3339)?;
    fields.insert(category.date_field().to_owned(), Value::String(stamp));
    fields.insert("status".to_owned(), Value::String(ApplicationStatus::Pending.to_string()));
    let id = store.create(category.collection(), data).await?;
    info!(%id, collection = category.collection().name(), "submission stored");
    Ok(id)
}

/// Decode submissions of `category`, newest first. Undated entries sort last
/// and undecodable documents are skipped.
#[must_use]
pub fn decode_entries(category: Category, docs: &[Document]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = docs
        .iter()
        .filter_map(|doc| match serde_json::from_value::<EntryFields>(doc.data.clone()) {
            Ok(fields) => Some(Entry {
                id: doc.id.clone(),
                category,
                full_name: fields.full_name,
                phone: fields.phone,
                email: fields.email,
                status: fields.status,
                job_type: fields.job_type,
                submitted_at: doc
                    .data
                    .get(category.date_field())
                    .and_then(Value::as_str)
                    .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok()),
                data: doc.data.clone(),
            }),
            Err(err) => {
                warn!(collection = category.collection().name(), id = %doc.id, error = %err, "skipping malformed entry");
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    entries
}

pub async fn load_entries(store: &dyn DocumentStore, category: Category) -> Result<Vec<Entry>, StoreError> {
    let docs = store.list(category.collection()).await?;
    Ok(decode_entries(category, &docs))
}

#[must_use]
pub fn filter_entries<'a>(
    entries: &'a [Entry],
    status: StatusFilter,
    job_type: JobTypeFilter,
    search: &str,
) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|e| status.matches(e.status) && job_type.matches(e.job_type))
        .filter(|e| matches_search(search, &e.full_name, &e.phone, e.email.as_deref()))
        .collect()
}

/// Admin list header counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub teachers: usize,
    pub staff: usize,
}

#[must_use]
pub fn counts(entries: &[Entry]) -> EntryCounts {
    let mut out = EntryCounts { total: entries.len(), ..EntryCounts::default() };
    for entry in entries {
        match entry.status {
            ApplicationStatus::Pending => out.pending += 1,
            ApplicationStatus::Approved => out.approved += 1,
            ApplicationStatus::Rejected => out.rejected += 1,
        }
        match entry.job_type {
            Some(JobType::Teacher) => out.teachers += 1,
            Some(JobType::Staff) => out.staff += 1,
            None => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "entries_test.rs"]
mod tests;
