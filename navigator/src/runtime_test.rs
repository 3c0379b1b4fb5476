use std::time::Duration;

use super::*;
use crate::back::BackButton;
use crate::render::Screen;
use crate::session::SessionHub;
use crate::state::TransitionKind;

/// Let spawned tasks run to their next await point.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

async fn started(hub: &SessionHub) -> Navigator {
    let nav = Navigator::new(NavigatorOptions::default(), None);
    nav.start(hub);
    settle().await;
    nav
}

async fn booted(hub: &SessionHub) -> Navigator {
    let nav = started(hub).await;
    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Choice);
    nav
}

// =============================================================
// Bootstrap timer
// =============================================================

#[tokio::test(start_paused = true)]
async fn splash_holds_until_delay_elapses() {
    let hub = SessionHub::new();
    let nav = started(&hub).await;
    assert_eq!(nav.current(), PageId::Bootstrap);

    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Bootstrap);

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Choice);
    assert!(nav.snapshot().history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_delay_is_honoured() {
    let hub = SessionHub::new();
    let nav = Navigator::new(NavigatorOptions { bootstrap_delay: Duration::from_millis(500) }, None);
    nav.start(&hub);
    settle().await;
    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Choice);
}

#[tokio::test(start_paused = true)]
async fn early_navigation_supersedes_timer() {
    let hub = SessionHub::new();
    let nav = started(&hub).await;
    nav.navigate_to(PageId::Workshops);

    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Workshops);
}

#[tokio::test(start_paused = true)]
async fn go_back_after_boot_lands_on_choice() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    assert!(nav.go_back().is_none());
    nav.go_back();
    assert_eq!(nav.current(), PageId::Choice);
}

#[tokio::test(start_paused = true)]
async fn workshops_jobs_back_scenario() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.navigate_to(PageId::Workshops);
    nav.navigate_to(PageId::Jobs);
    let t = nav.go_back().expect("transition");
    assert_eq!(t.kind, TransitionKind::Pop);

    let snap = nav.snapshot();
    assert_eq!(snap.current, PageId::Workshops);
    assert_eq!(snap.history, vec![PageId::Choice]);
}

// =============================================================
// Session listener
// =============================================================

#[tokio::test(start_paused = true)]
async fn session_before_splash_ends_does_not_skip_splash() {
    let hub = SessionHub::new();
    let nav = started(&hub).await;
    hub.publish(true);
    settle().await;
    assert_eq!(nav.current(), PageId::Bootstrap);
    assert!(nav.snapshot().session_present);

    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Choice);

    nav.select_destination(Destination::Admin);
    assert_eq!(nav.current(), PageId::AdminDashboard);
}

#[tokio::test(start_paused = true)]
async fn login_redirects_to_dashboard() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.select_destination(Destination::Admin);
    assert_eq!(nav.current(), PageId::AdminLogin);

    hub.publish(true);
    settle().await;
    assert_eq!(nav.current(), PageId::AdminDashboard);
    assert_eq!(nav.snapshot().history, vec![PageId::Choice]);
}

#[tokio::test(start_paused = true)]
async fn logout_on_dashboard_returns_home() {
    let hub = SessionHub::new();
    hub.publish(true);
    let nav = booted(&hub).await;
    nav.navigate_to(PageId::Clubs);
    nav.select_destination(Destination::Admin);
    assert_eq!(nav.current(), PageId::AdminDashboard);

    hub.publish(false);
    settle().await;
    assert_eq!(nav.current(), PageId::Choice);
}

#[tokio::test(start_paused = true)]
async fn session_change_while_browsing_is_ignored() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.navigate_to(PageId::Workshops);
    hub.publish(true);
    settle().await;
    assert_eq!(nav.current(), PageId::Workshops);
}

#[tokio::test(start_paused = true)]
async fn login_success_callback_redirects_to_dashboard() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.select_destination(Destination::Admin);
    let mount = nav.mount();
    assert_eq!(mount.screen, Screen::AdminLogin);

    mount.on_login_success.expect("callback").call();
    assert_eq!(nav.current(), PageId::AdminDashboard);
    assert_eq!(nav.snapshot().history, vec![PageId::Choice]);
    // No session yet: the dashboard is guarded.
    assert_eq!(nav.mount().screen, Screen::Splash);

    hub.publish(true);
    settle().await;
    assert_eq!(nav.mount().screen, Screen::AdminDashboard);
}

#[tokio::test(start_paused = true)]
async fn mounted_back_callback_goes_back() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.navigate_to(PageId::CourseCategory);
    nav.mount().on_back.expect("on_back").call();
    assert_eq!(nav.current(), PageId::Choice);
}

// =============================================================
// Teardown
// =============================================================

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_timer_and_listener() {
    let hub = SessionHub::new();
    let nav = started(&hub).await;
    assert!(nav.is_running());
    assert_eq!(hub.subscriber_count(), 1);

    nav.shutdown();
    settle().await;
    assert!(!nav.is_running());
    assert_eq!(hub.subscriber_count(), 0);

    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;
    assert_eq!(nav.current(), PageId::Bootstrap);

    nav.shutdown();
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_releases_subscription() {
    let hub = SessionHub::new();
    let nav = started(&hub).await;
    drop(nav);
    settle().await;
    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_resets_to_bootstrap() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    nav.navigate_to(PageId::Jobs);
    nav.start(&hub);
    settle().await;
    let snap = nav.snapshot();
    assert_eq!(snap.current, PageId::Bootstrap);
    assert!(snap.history.is_empty());
    assert_eq!(hub.subscriber_count(), 1);
}

// =============================================================
// Page watch
// =============================================================

#[tokio::test(start_paused = true)]
async fn page_watch_sees_transitions() {
    let hub = SessionHub::new();
    let nav = booted(&hub).await;
    let mut pages = nav.subscribe_pages();
    assert_eq!(*pages.borrow_and_update(), PageId::Choice);

    nav.navigate_to(PageId::Internship);
    pages.changed().await.expect("changed");
    assert_eq!(*pages.borrow_and_update(), PageId::Internship);
}

// =============================================================
// Platform back
// =============================================================

#[tokio::test(start_paused = true)]
async fn back_press_is_go_back() {
    let hub = SessionHub::new();
    let button = BackButton::new();
    let nav = Navigator::new(NavigatorOptions::default(), Some(Arc::new(button.clone())));
    nav.start(&hub);
    settle().await;
    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;

    nav.navigate_to(PageId::Clubs);
    nav.navigate_to(PageId::Jobs);
    assert!(button.press());
    assert_eq!(nav.current(), PageId::Clubs);
    assert!(button.press());
    assert!(button.press());
    assert_eq!(nav.current(), PageId::Choice);
}

#[tokio::test(start_paused = true)]
async fn back_handler_rebinds_on_history_change() {
    let hub = SessionHub::new();
    let button = BackButton::new();
    let nav = Navigator::new(NavigatorOptions::default(), Some(Arc::new(button.clone())));
    nav.start(&hub);
    settle().await;
    assert_eq!(button.registrations(), 1);

    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;
    // Leaving the splash does not touch history.
    assert_eq!(button.registrations(), 1);

    nav.navigate_to(PageId::Workshops);
    assert_eq!(button.registrations(), 2);
    nav.go_back();
    assert_eq!(button.registrations(), 3);
    // Empty history, already home: nothing changes, no rebind.
    nav.go_back();
    assert_eq!(button.registrations(), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_unregisters_back_handler() {
    let hub = SessionHub::new();
    let button = BackButton::new();
    let nav = Navigator::new(NavigatorOptions::default(), Some(Arc::new(button.clone())));
    nav.start(&hub);
    assert!(button.is_registered());
    nav.shutdown();
    assert!(!button.is_registered());
    assert!(!button.press());
}

#[tokio::test(start_paused = true)]
async fn history_changes_after_shutdown_leave_back_unregistered() {
    let hub = SessionHub::new();
    let button = BackButton::new();
    let nav = Navigator::new(NavigatorOptions::default(), Some(Arc::new(button.clone())));
    nav.start(&hub);
    nav.shutdown();
    let registrations = button.registrations();

    nav.navigate_to(PageId::Jobs);
    nav.navigate_to(PageId::Clubs);
    nav.go_back();
    assert!(!button.is_registered());
    assert_eq!(button.registrations(), registrations);

    // A fresh start binds again.
    nav.start(&hub);
    assert!(button.is_registered());
}

#[tokio::test(start_paused = true)]
async fn back_press_after_login_does_not_reopen_login_form() {
    let hub = SessionHub::new();
    let button = BackButton::new();
    let nav = Navigator::new(NavigatorOptions::default(), Some(Arc::new(button.clone())));
    nav.start(&hub);
    settle().await;
    tokio::time::advance(DEFAULT_BOOTSTRAP_DELAY).await;
    settle().await;

    nav.select_destination(Destination::Admin);
    hub.publish(true);
    nav.mount().on_login_success.expect("callback").call();
    settle().await;
    assert_eq!(nav.current(), PageId::AdminDashboard);

    assert!(button.press());
    assert_eq!(nav.current(), PageId::Choice);
}
