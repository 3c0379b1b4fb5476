//! Headless front end: one command per line drives the navigator and services.
//!
//! Each line is tokenized (double quotes group words), parsed with clap, then
//! run against the current page. Page-bound commands (`apply`, `submit`,
//! `register`, `login`, review actions) refuse to run from the wrong page, the
//! same way the forms only exist on their own screens.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use navigator::{BackButton, Destination, Mount, Navigator, PageId, Screen};
use serde_json::{Map, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::services::Notice;
use crate::services::applications::{
    self, ApplicationStatus, RegistrationForm, RegistrationType, StatusFilter, TypeFilter,
};
use crate::services::auth::AuthProvider;
use crate::services::entries::{self, JobTypeFilter};
use crate::services::stats::{self, Category, Period};
use crate::services::store::{DocumentStore, StoreError};
use crate::services::workshops::{self, NewWorkshop, WorkshopSignup};

const BAR_WIDTH: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("'{command}' is not available on {current}")]
    WrongPage { command: &'static str, current: PageId },
    #[error("this front end has no system back gesture")]
    NoBackGesture,
    #[error("'{command}' does not apply to {category:?}")]
    WrongCategory { command: &'static str, category: Category },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Stats(#[from] stats::StatsError),
}

#[derive(Parser, Debug)]
#[command(name = "portal", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Navigate directly to a page.
    Go { page: PageId },
    /// Pick a menu entry: admin, basic, full, or a page id.
    Select { destination: Destination },
    /// In-app back button.
    Back,
    /// System back gesture (mobile only).
    PressBack,
    /// Sign in from the admin login page.
    Login { email: String, password: String },
    Logout,
    /// Print the current page and back stack.
    Show,
    /// Submit the course registration form on the current page.
    Apply {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        wilaya: String,
        #[arg(long)]
        education: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        payment: Option<String>,
        /// Uploaded ID card images and payment proof (full registration).
        #[arg(long)]
        id_front: Option<String>,
        #[arg(long)]
        id_back: Option<String>,
        #[arg(long)]
        payment_proof: Option<String>,
        #[arg(long)]
        agree: bool,
    },
    /// Submit the club, job or internship form on the current page.
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        /// Extra `key=value` field, repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// List upcoming workshops on the workshops page.
    Workshops,
    /// Sign up for a workshop from the workshops page.
    Register {
        workshop_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// List course applications on the dashboard.
    Apps {
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long = "type", default_value = "all")]
        kind: TypeFilter,
        /// Name, phone or email fragment.
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List club, job or internship submissions on the dashboard.
    Entries {
        category: Category,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "all")]
        job_type: JobTypeFilter,
        #[arg(long, default_value = "")]
        search: String,
    },
    Approve {
        id: String,
        #[arg(long = "in", default_value = "courses")]
        category: Category,
    },
    Reject {
        id: String,
        #[arg(long = "in", default_value = "courses")]
        category: Category,
    },
    Delete {
        id: String,
        #[arg(long = "in", default_value = "courses")]
        category: Category,
    },
    /// Publish a workshop from the dashboard.
    WorkshopAdd {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        arabic_name: String,
        /// Workshop day (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        date: Date,
        #[arg(long)]
        seats: u32,
        #[arg(long, default_value = "")]
        duration: String,
    },
    /// Submission statistics for a month or a year.
    Stats {
        #[arg(default_value = "month")]
        period: Period,
        /// Anchor date (YYYY-MM-DD), defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },
    #[command(alias = "exit")]
    Quit,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
}

/// Split a line on whitespace, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

pub struct Shell {
    navigator: Navigator,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    back_button: Option<BackButton>,
}

impl Shell {
    /// `back_button` is the system back control on mobile, `None` on web.
    pub fn new(
        navigator: Navigator,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        back_button: Option<BackButton>,
    ) -> Self {
        Self { navigator, auth, store, back_button }
    }

    /// Parse and run one input line. Blank lines print nothing.
    pub async fn execute(&self, line: &str) -> Result<Outcome, ShellError> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Outcome::Print(String::new()));
        }
        let parsed = Line::try_parse_from(tokens)?;
        debug!(command = ?parsed.command, "shell command");
        self.run(parsed.command).await
    }

    async fn run(&self, command: Command) -> Result<Outcome, ShellError> {
        let text = match command {
            Command::Go { page } => {
                self.navigator.navigate_to(page);
                self.describe()
            }
            Command::Select { destination } => {
                self.navigator.select_destination(destination);
                self.describe()
            }
            Command::Back => {
                let mount = self.navigator.mount();
                match mount.on_back {
                    Some(on_back) => on_back.call(),
                    None => return Err(ShellError::WrongPage { command: "back", current: mount.page }),
                }
                self.describe()
            }
            Command::PressBack => {
                let button = self.back_button.as_ref().ok_or(ShellError::NoBackGesture)?;
                button.press();
                self.describe()
            }
            Command::Login { email, password } => self.login(&email, &password).await?,
            Command::Logout => {
                self.require_dashboard("logout")?;
                if let Err(err) = self.auth.sign_out().await {
                    return Ok(Outcome::Print(Notice::from(&err).to_string()));
                }
                // Apply the logout redirect now rather than waiting on the listener.
                self.navigator.on_session_change(self.auth.session().is_present());
                self.describe()
            }
            Command::Show => self.describe(),
            Command::Apply {
                name,
                age,
                phone,
                course,
                wilaya,
                education,
                email,
                payment,
                id_front,
                id_back,
                payment_proof,
                agree,
            } => {
                let registration_type = match self.navigator.current() {
                    PageId::RegistrationBasic => RegistrationType::Basic,
                    PageId::RegistrationFull => RegistrationType::Full,
                    current => return Err(ShellError::WrongPage { command: "apply", current }),
                };
                let form = RegistrationForm {
                    full_name: name,
                    age,
                    phone,
                    email,
                    wilaya,
                    education,
                    course,
                    registration_type,
                    payment_method: payment,
                    agreed_to_contract: agree,
                    payment_proof_url: payment_proof,
                    id_front_url: id_front,
                    id_back_url: id_back,
                    ..RegistrationForm::default()
                };
                applications::submit(self.store.as_ref(), form, OffsetDateTime::now_utc()).await.to_string()
            }
            Command::Submit { name, phone, fields } => {
                let current = self.navigator.current();
                let category =
                    entry_category(current).ok_or(ShellError::WrongPage { command: "submit", current })?;
                let mut data: Map<String, Value> =
                    fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
                data.insert("fullName".to_owned(), Value::String(name));
                if let Some(phone) = phone {
                    data.insert("phone".to_owned(), Value::String(phone));
                }
                let submitted =
                    entries::submit_entry(self.store.as_ref(), category, Value::Object(data), OffsetDateTime::now_utc())
                        .await;
                match submitted {
                    Ok(_) => Notice::success("تم إرسال الطلب بنجاح").to_string(),
                    Err(err) => Notice::from(&err).to_string(),
                }
            }
            Command::Workshops => {
                self.require_page("workshops", PageId::Workshops)?;
                let open = workshops::load_upcoming(self.store.as_ref(), OffsetDateTime::now_utc().date()).await?;
                render_workshops(&open)
            }
            Command::Register { workshop_id, name, phone, email } => {
                self.require_page("register", PageId::Workshops)?;
                let signup = WorkshopSignup { full_name: name, phone, email };
                workshops::register_notice(self.store.as_ref(), &workshop_id, signup, OffsetDateTime::now_utc())
                    .await
                    .to_string()
            }
            Command::Apps { status, kind, search } => {
                self.require_dashboard("apps")?;
                self.list_applications(status, kind, &search).await?
            }
            Command::Entries { category, status, job_type, search } => {
                self.require_dashboard("entries")?;
                if !matches!(category, Category::Clubs | Category::Jobs | Category::Interns) {
                    return Err(ShellError::WrongCategory { command: "entries", category });
                }
                self.list_entries(category, status, job_type, &search).await?
            }
            Command::Approve { id, category } => self.review(&id, category, Some(ApplicationStatus::Approved)).await?,
            Command::Reject { id, category } => self.review(&id, category, Some(ApplicationStatus::Rejected)).await?,
            Command::Delete { id, category } => self.review(&id, category, None).await?,
            Command::WorkshopAdd { name, arabic_name, date, seats, duration } => {
                self.require_dashboard("workshop-add")?;
                let new = NewWorkshop { name, arabic_name, duration, max_participants: seats, ..NewWorkshop::default() };
                let now = OffsetDateTime::now_utc();
                let id = workshops::create_workshop(self.store.as_ref(), new, date.midnight().assume_utc(), now).await?;
                format!("workshop {id}")
            }
            Command::Stats { period, date } => {
                self.require_dashboard("stats")?;
                let anchor = date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
                let records = stats::load_records(self.store.as_ref()).await?;
                render_report(&stats::report(&records, period, anchor)?)
            }
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Print(text))
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ShellError> {
        let mount = self.navigator.mount();
        let Some(on_login_success) = mount.on_login_success else {
            return Err(ShellError::WrongPage { command: "login", current: mount.page });
        };
        match self.auth.sign_in(email, password).await {
            Ok(()) => {
                on_login_success.call();
                Ok(self.describe())
            }
            Err(err) => Ok(Notice::from(&err).to_string()),
        }
    }

    async fn review(
        &self,
        id: &str,
        category: Category,
        status: Option<ApplicationStatus>,
    ) -> Result<String, ShellError> {
        let command = if status.is_some() { "approve/reject" } else { "delete" };
        self.require_dashboard(command)?;
        if !category.reviewable() {
            return Err(ShellError::WrongCategory { command, category });
        }
        let collection = category.collection();
        let notice = match status {
            Some(status) => applications::set_status(self.store.as_ref(), collection, id, status).await,
            None => applications::delete(self.store.as_ref(), collection, id).await,
        };
        Ok(notice.to_string())
    }

    async fn list_applications(
        &self,
        status: StatusFilter,
        kind: TypeFilter,
        search: &str,
    ) -> Result<String, ShellError> {
        let apps = applications::load_applications(self.store.as_ref()).await?;
        let counts = applications::counts(&apps, OffsetDateTime::now_utc().date());
        let mut out = format!(
            "total {} | pending {} | approved {} | rejected {} | basic {} | full {} | this month {}",
            counts.total, counts.pending, counts.approved, counts.rejected, counts.basic, counts.full, counts.this_month
        );
        for app in applications::filter(&apps, status, kind, search) {
            let _ = write!(
                out,
                "\n{}  {:<8}  {:<5}  {}  {}  {}",
                app.id,
                app.status,
                app.registration_type,
                app.full_name,
                app.course,
                app.submission_date.date()
            );
        }
        Ok(out)
    }

    async fn list_entries(
        &self,
        category: Category,
        status: StatusFilter,
        job_type: JobTypeFilter,
        search: &str,
    ) -> Result<String, ShellError> {
        let all = entries::load_entries(self.store.as_ref(), category).await?;
        let counts = entries::counts(&all);
        let mut out = format!(
            "{}: total {} | pending {} | approved {} | rejected {}",
            category.title(),
            counts.total,
            counts.pending,
            counts.approved,
            counts.rejected
        );
        if category == Category::Jobs {
            let _ = write!(out, " | teachers {} | staff {}", counts.teachers, counts.staff);
        }
        for entry in entries::filter_entries(&all, status, job_type, search) {
            let _ = write!(out, "\n{}  {:<8}  {}  {}", entry.id, entry.status, entry.full_name, entry.phone);
            if let Some(job_type) = entry.job_type {
                let _ = write!(out, "  {}", job_type.label());
            }
            if let Some(at) = entry.submitted_at {
                let _ = write!(out, "  {}", at.date());
            }
        }
        Ok(out)
    }

    fn require_page(&self, command: &'static str, page: PageId) -> Result<(), ShellError> {
        let current = self.navigator.current();
        if current == page { Ok(()) } else { Err(ShellError::WrongPage { command, current }) }
    }

    fn require_dashboard(&self, command: &'static str) -> Result<(), ShellError> {
        let mount = self.navigator.mount();
        if mount.screen == Screen::AdminDashboard {
            Ok(())
        } else {
            Err(ShellError::WrongPage { command, current: mount.page })
        }
    }

    fn describe(&self) -> String {
        describe(&self.navigator.mount(), &self.navigator.snapshot().history)
    }
}

fn entry_category(page: PageId) -> Option<Category> {
    match page {
        PageId::Clubs => Some(Category::Clubs),
        PageId::Jobs => Some(Category::Jobs),
        PageId::Internship => Some(Category::Interns),
        _ => None,
    }
}

fn describe(mount: &Mount, history: &[PageId]) -> String {
    let trail: Vec<&str> = history.iter().map(|p| p.as_str()).collect();
    let mut out = format!("{} ({}) screen={:?}", mount.page, mount.page.title(), mount.screen);
    if !trail.is_empty() {
        let _ = write!(out, " history={}", trail.join(" > "));
    }
    if mount.on_back.is_some() {
        out.push_str(" [back]");
    }
    out
}

fn render_workshops(open: &[workshops::Workshop]) -> String {
    if open.is_empty() {
        return "لا توجد ورش قادمة".to_owned();
    }
    let lines: Vec<String> = open
        .iter()
        .map(|w| {
            let seats = if w.is_full() {
                "الورشة مكتملة".to_owned()
            } else {
                format!("{} مقعد متبقي", w.seats_left())
            };
            format!("{}  {}  {}  {}  {seats}", w.id, w.date.date(), w.display_name(), w.duration)
        })
        .collect();
    lines.join("\n")
}

fn render_report(report: &stats::Report) -> String {
    let mut out = format!("{:?} {}: total {}", report.period, report.range, report.summary.total());
    for category in Category::ALL {
        let _ = write!(out, "\n  {}: {}", category.title(), report.summary.get(category));
    }
    for bucket in &report.buckets {
        let total = bucket.tally.total();
        let width = (total * BAR_WIDTH).checked_div(report.max_total).unwrap_or(0);
        let _ = write!(out, "\n{:<14} {:<20} {total}", bucket.label, "#".repeat(width));
    }
    out
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
