use super::*;

fn booted() -> NavigationState {
    let mut state = NavigationState::new();
    state.finish_bootstrap();
    state
}

fn assert_history_invariant(state: &NavigationState) {
    assert_ne!(state.history().last(), Some(&state.current()), "history ends with current page");
    assert!(!state.history().contains(&PageId::Bootstrap), "bootstrap leaked into history");
}

// =============================================================
// Bootstrap
// =============================================================

#[test]
fn new_state_starts_on_bootstrap_with_empty_history() {
    let state = NavigationState::new();
    assert_eq!(state.current(), PageId::Bootstrap);
    assert!(state.history().is_empty());
    assert!(!state.session_present());
    assert!(state.bootstrap_pending());
}

#[test]
fn finish_bootstrap_redirects_to_choice() {
    let mut state = NavigationState::new();
    let t = state.finish_bootstrap().expect("transition");
    assert_eq!(t, Transition { from: PageId::Bootstrap, to: PageId::Choice, kind: TransitionKind::Redirect });
    assert_eq!(state.current(), PageId::Choice);
    assert!(state.history().is_empty());
    assert!(!state.bootstrap_pending());
}

#[test]
fn finish_bootstrap_is_noop_once_superseded() {
    let mut state = NavigationState::new();
    state.navigate_to(PageId::Workshops);
    assert!(state.finish_bootstrap().is_none());
    assert_eq!(state.current(), PageId::Workshops);
}

#[test]
fn finish_bootstrap_fires_only_once() {
    let mut state = NavigationState::new();
    assert!(state.finish_bootstrap().is_some());
    state.navigate_to(PageId::Bootstrap);
    assert!(state.finish_bootstrap().is_none());
    assert_eq!(state.current(), PageId::Bootstrap);
}

#[test]
fn leaving_bootstrap_early_does_not_record_it() {
    let mut state = NavigationState::new();
    state.navigate_to(PageId::Clubs);
    assert!(state.history().is_empty());
    state.go_back();
    assert_eq!(state.current(), PageId::Choice);
}

// =============================================================
// navigate_to / go_back
// =============================================================

#[test]
fn navigate_pushes_previous_page() {
    let mut state = booted();
    let t = state.navigate_to(PageId::Workshops).expect("transition");
    assert_eq!(t.kind, TransitionKind::Push);
    assert_eq!(state.current(), PageId::Workshops);
    assert_eq!(state.history(), &[PageId::Choice]);
}

#[test]
fn navigate_to_current_page_is_noop() {
    let mut state = booted();
    state.navigate_to(PageId::Jobs);
    assert!(state.navigate_to(PageId::Jobs).is_none());
    assert_eq!(state.history(), &[PageId::Choice]);
    assert_history_invariant(&state);
}

#[test]
fn go_back_reverses_most_recent_navigation() {
    let sequences: [&[PageId]; 3] = [
        &[PageId::Workshops],
        &[PageId::CourseCategory, PageId::RegistrationFull],
        &[PageId::Clubs, PageId::Jobs, PageId::Internship, PageId::AdminLogin],
    ];
    for seq in sequences {
        let mut state = booted();
        for page in seq {
            state.navigate_to(*page);
        }
        let before_last = state.history().last().copied().expect("history");
        state.go_back();
        assert_eq!(state.current(), before_last);
        assert_history_invariant(&state);
    }
}

#[test]
fn go_back_on_fresh_state_lands_on_choice() {
    let mut state = booted();
    assert!(state.go_back().is_none());
    assert_eq!(state.current(), PageId::Choice);
}

#[test]
fn go_back_from_bootstrap_lands_on_choice() {
    let mut state = NavigationState::new();
    let t = state.go_back().expect("transition");
    assert_eq!(t.kind, TransitionKind::Home);
    assert_eq!(state.current(), PageId::Choice);
}

#[test]
fn excess_go_back_stabilizes_on_choice() {
    let mut state = booted();
    state.navigate_to(PageId::CourseCategory);
    state.navigate_to(PageId::RegistrationBasic);
    for _ in 0..10 {
        state.go_back();
    }
    assert_eq!(state.current(), PageId::Choice);
    assert!(state.history().is_empty());
}

#[test]
fn go_back_with_empty_history_off_home_returns_home() {
    let mut state = NavigationState::new();
    state.navigate_to(PageId::Jobs);
    let t = state.go_back().expect("transition");
    assert_eq!(t, Transition { from: PageId::Jobs, to: PageId::Choice, kind: TransitionKind::Home });
}

#[test]
fn workshops_jobs_back_scenario() {
    let mut state = booted();
    state.navigate_to(PageId::Workshops);
    state.navigate_to(PageId::Jobs);
    state.go_back();
    assert_eq!(state.current(), PageId::Workshops);
    assert_eq!(state.history(), &[PageId::Choice]);
}

// =============================================================
// Session changes
// =============================================================

#[test]
fn session_on_login_page_redirects_to_dashboard() {
    let mut state = booted();
    state.navigate_to(PageId::AdminLogin);
    let t = state.on_session_change(true).expect("transition");
    assert_eq!(t.kind, TransitionKind::Redirect);
    assert_eq!(state.current(), PageId::AdminDashboard);
    assert_eq!(state.history(), &[PageId::Choice]);
    assert!(state.session_present());
}

#[test]
fn back_from_redirected_dashboard_skips_login_form() {
    let mut state = booted();
    state.navigate_to(PageId::AdminLogin);
    state.on_session_change(true);
    state.go_back();
    assert_eq!(state.current(), PageId::Choice);
}

#[test]
fn complete_login_replaces_login_form() {
    let mut state = booted();
    state.navigate_to(PageId::AdminLogin);
    let t = state.complete_login().expect("transition");
    assert_eq!(t.kind, TransitionKind::Redirect);
    assert_eq!(state.current(), PageId::AdminDashboard);
    assert_eq!(state.history(), &[PageId::Choice]);

    // The session signal arriving afterwards changes nothing.
    assert!(state.on_session_change(true).is_none());
    state.go_back();
    assert_eq!(state.current(), PageId::Choice);
    assert_history_invariant(&state);
}

#[test]
fn complete_login_off_login_page_is_noop() {
    let mut state = booted();
    state.navigate_to(PageId::Workshops);
    assert!(state.complete_login().is_none());
    assert_eq!(state.current(), PageId::Workshops);
}

#[test]
fn session_elsewhere_does_not_interrupt_browsing() {
    let mut state = booted();
    state.navigate_to(PageId::Workshops);
    assert!(state.on_session_change(true).is_none());
    assert_eq!(state.current(), PageId::Workshops);
    assert!(state.session_present());
}

#[test]
fn session_loss_on_dashboard_returns_home() {
    let mut state = booted();
    state.on_session_change(true);
    state.select_destination(Destination::Admin);
    assert_eq!(state.current(), PageId::AdminDashboard);

    let t = state.on_session_change(false).expect("transition");
    assert_eq!(t.to, PageId::Choice);
    assert_eq!(state.current(), PageId::Choice);
    assert_history_invariant(&state);

    assert!(state.on_session_change(false).is_none());
    assert!(state.on_session_change(false).is_none());
    assert_eq!(state.current(), PageId::Choice);
}

#[test]
fn repeated_session_true_on_dashboard_is_noop() {
    let mut state = booted();
    state.on_session_change(true);
    state.select_destination(Destination::Admin);
    let history = state.history().to_vec();
    assert!(state.on_session_change(true).is_none());
    assert_eq!(state.current(), PageId::AdminDashboard);
    assert_eq!(state.history(), history.as_slice());
}

#[test]
fn session_loss_off_dashboard_keeps_page() {
    let mut state = booted();
    state.navigate_to(PageId::Clubs);
    state.on_session_change(true);
    assert!(state.on_session_change(false).is_none());
    assert_eq!(state.current(), PageId::Clubs);
    assert!(!state.session_present());
}

// =============================================================
// select_destination
// =============================================================

#[test]
fn admin_without_session_opens_login() {
    let mut state = booted();
    state.navigate_to(PageId::Clubs);
    state.select_destination(Destination::Admin);
    assert_eq!(state.current(), PageId::AdminLogin);
    state.go_back();
    assert_eq!(state.current(), PageId::Clubs);
}

#[test]
fn admin_with_session_opens_dashboard() {
    let mut state = booted();
    state.on_session_change(true);
    state.navigate_to(PageId::Jobs);
    state.select_destination(Destination::Admin);
    assert_eq!(state.current(), PageId::AdminDashboard);
    state.go_back();
    assert_eq!(state.current(), PageId::Jobs);
}

#[test]
fn course_destinations_map_to_registration_pages() {
    let mut state = booted();
    state.select_destination(Destination::Page(PageId::CourseCategory));
    state.select_destination(Destination::Full);
    assert_eq!(state.current(), PageId::RegistrationFull);
    state.go_back();
    state.select_destination(Destination::Basic);
    assert_eq!(state.current(), PageId::RegistrationBasic);
    assert_eq!(state.history(), &[PageId::Choice, PageId::CourseCategory]);
}

#[test]
fn resolve_destination_has_no_side_effects() {
    let state = booted();
    assert_eq!(state.resolve_destination(Destination::Admin), PageId::AdminLogin);
    assert_eq!(state.current(), PageId::Choice);
}
