//! Page navigation core shared by the web and mobile front ends.
//!
//! This crate owns which page is visible: a back stack, the splash-screen
//! timer, and redirects driven by the admin session. It knows nothing about
//! forms, storage, or rendering; front ends consume [`Mount`]s and call the
//! transition methods on [`Navigator`].

pub mod back;
pub mod page;
pub mod render;
pub mod runtime;
pub mod session;
pub mod state;

pub use back::{BackButton, BackControl, BackHandler};
pub use page::{Destination, PageId, ParsePageError};
pub use render::{Callback, Mount, PageActions, RegistrationKind, Screen};
pub use runtime::{DEFAULT_BOOTSTRAP_DELAY, Navigator, NavigatorOptions, Snapshot};
pub use session::{SessionHub, SessionSignal, SessionSubscription};
pub use state::{HOME_PAGE, NavigationState, Transition, TransitionKind};
