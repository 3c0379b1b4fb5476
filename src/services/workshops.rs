//! Workshops: the upcoming list, seat counts and capacity-checked sign-up.
//!
//! A workshop document tracks `maxParticipants` and `currentParticipants`.
//! Registration stores a `workshopRegistrations` document pointing at the
//! workshop, then bumps the participant count. The page only offers active
//! workshops dated today or later.

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, OffsetDateTime};
use tracing::{error, info, warn};

use super::Notice;
use super::applications::{ValidationError, is_blank, validate_phone};
use super::store::{Collection, Document, DocumentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arabic_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Free text, e.g. "3 ساعات".
    #[serde(default)]
    pub duration: String,
    pub max_participants: u32,
    #[serde(default)]
    pub current_participants: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

impl Workshop {
    #[must_use]
    pub fn seats_left(&self) -> u32 {
        self.max_participants.saturating_sub(self.current_participants)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    /// Open for sign-up on `today`.
    #[must_use]
    pub fn is_upcoming(&self, today: Date) -> bool {
        self.is_active && self.date.date() >= today
    }

    /// Arabic name when set, else the plain name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.arabic_name.trim().is_empty() { &self.name } else { &self.arabic_name }
    }
}

/// Admin input for a new workshop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWorkshop {
    pub name: String,
    pub arabic_name: String,
    pub description: String,
    pub duration: String,
    pub max_participants: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Attended,
    Cancelled,
}

/// Stored workshop sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopRegistration {
    pub workshop_id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub registration_date: OffsetDateTime,
    pub status: RegistrationStatus,
}

/// What the workshop sign-up form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkshopSignup {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkshopError {
    #[error("workshop {0} not found")]
    NotFound(String),
    #[error("workshop {0} is not open for registration")]
    Closed(String),
    #[error("workshop {0} is full")]
    Full(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<&WorkshopError> for Notice {
    fn from(err: &WorkshopError) -> Self {
        match err {
            WorkshopError::NotFound(_) | WorkshopError::Closed(_) => Self::error("الورشة غير متاحة للتسجيل"),
            WorkshopError::Full(_) => Self::error("الورشة مكتملة"),
            WorkshopError::Validation(invalid) => Self::error(invalid.message()),
            WorkshopError::Store(_) => Self::error("حدث خطأ أثناء التسجيل. يرجى المحاولة مرة أخرى."),
        }
    }
}

fn decode(doc: &Document) -> Result<Workshop, serde_json::Error> {
    let mut workshop: Workshop = serde_json::from_value(doc.data.clone())?;
    workshop.id.clone_from(&doc.id);
    Ok(workshop)
}

/// Decode stored workshops. Undecodable documents are skipped.
#[must_use]
pub fn decode_workshops(docs: &[Document]) -> Vec<Workshop> {
    docs.iter()
        .filter_map(|doc| match decode(doc) {
            Ok(workshop) => Some(workshop),
            Err(err) => {
                warn!(id = %doc.id, error = %err, "skipping malformed workshop");
                None
            }
        })
        .collect()
}

/// Active workshops dated `today` or later, soonest first.
#[must_use]
pub fn upcoming(workshops: Vec<Workshop>, today: Date) -> Vec<Workshop> {
    let mut open: Vec<Workshop> = workshops.into_iter().filter(|w| w.is_upcoming(today)).collect();
    open.sort_by(|a, b| a.date.cmp(&b.date));
    open
}

pub async fn load_upcoming(store: &dyn DocumentStore, today: Date) -> Result<Vec<Workshop>, StoreError> {
    let docs = store.list(Collection::Workshops).await?;
    Ok(upcoming(decode_workshops(&docs), today))
}

/// Publish a workshop with no participants. Returns the new document id.
pub async fn create_workshop(
    store: &dyn DocumentStore,
    new: NewWorkshop,
    date: OffsetDateTime,
    created_at: OffsetDateTime,
) -> Result<String, StoreError> {
    let workshop = Workshop {
        id: String::new(),
        name: new.name,
        arabic_name: new.arabic_name,
        description: new.description,
        image_url: None,
        date,
        duration: new.duration,
        max_participants: new.max_participants,
        current_participants: 0,
        is_active: true,
        created_at: Some(created_at),
    };
    let id = store.create(Collection::Workshops, serde_json::to_value(&workshop)?).await?;
    info!(%id, name = %workshop.name, seats = workshop.max_participants, "workshop created");
    Ok(id)
}

/// Sign up for an upcoming workshop that still has seats.
///
/// # Errors
///
/// [`WorkshopError::Full`] when no seat is left, [`WorkshopError::Closed`]
/// for inactive or past workshops. Both leave the store untouched.
pub async fn register(
    store: &dyn DocumentStore,
    workshop_id: &str,
    signup: WorkshopSignup,
    now: OffsetDateTime,
) -> Result<String, WorkshopError> {
    if signup.full_name.trim().is_empty() {
        return Err(ValidationError::MissingName.into());
    }
    validate_phone(&signup.phone)?;

    let docs = store.list(Collection::Workshops).await?;
    let doc = docs
        .iter()
        .find(|doc| doc.id == workshop_id)
        .ok_or_else(|| WorkshopError::NotFound(workshop_id.to_owned()))?;
    let workshop = decode(doc).map_err(StoreError::from)?;
    if !workshop.is_upcoming(now.date()) {
        return Err(WorkshopError::Closed(workshop_id.to_owned()));
    }
    if workshop.is_full() {
        return Err(WorkshopError::Full(workshop_id.to_owned()));
    }

    let registration = WorkshopRegistration {
        workshop_id: workshop_id.to_owned(),
        full_name: signup.full_name.trim().to_owned(),
        phone: signup.phone.trim().to_owned(),
        email: signup.email.filter(|email| !is_blank(Some(email.as_str()))),
        registration_date: now,
        status: RegistrationStatus::Registered,
    };
    let data = serde_json::to_value(&registration).map_err(StoreError::from)?;
    let id = store.create(Collection::WorkshopRegistrations, data).await?;
    store
        .update(
            Collection::Workshops,
            workshop_id,
            json!({ "currentParticipants": workshop.current_participants + 1 }),
        )
        .await?;
    info!(%id, workshop_id, seats_left = workshop.seats_left() - 1, "workshop registration stored");
    Ok(id)
}

/// Register from the workshops page and report the outcome.
pub async fn register_notice(
    store: &dyn DocumentStore,
    workshop_id: &str,
    signup: WorkshopSignup,
    now: OffsetDateTime,
) -> Notice {
    match register(store, workshop_id, signup, now).await {
        Ok(_) => Notice::success("تم التسجيل في الورشة بنجاح"),
        Err(err) => {
            match &err {
                WorkshopError::Store(failure) => error!(workshop_id, error = %failure, "workshop registration failed"),
                refused => warn!(workshop_id, error = %refused, "workshop registration refused"),
            }
            Notice::from(&err)
        }
    }
}

#[cfg(test)]
#[path = "workshops_test.rs"]
mod tests;
