use navigator::SessionSignal;

use super::*;

fn admin() -> AdminAuth {
    AdminAuth::new(
        Some(AdminCredentials { email: "admin@rising.dz".to_owned(), password: "s3cret".to_owned() }),
        SessionHub::new(),
    )
}

#[tokio::test]
async fn sign_in_with_valid_credentials_publishes_session() {
    let auth = admin();
    let mut sub = auth.session().subscribe();
    assert_eq!(sub.recv().await, Some(false));

    auth.sign_in(" Admin@Rising.dz", "s3cret").await.unwrap();
    assert!(auth.session().is_present());
    assert_eq!(sub.recv().await, Some(true));
}

#[tokio::test]
async fn sign_in_with_wrong_password_fails() {
    let auth = admin();
    let err = auth.sign_in("admin@rising.dz", "S3CRET").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!auth.session().is_present());
}

#[tokio::test]
async fn sign_in_without_configured_admin_is_disabled() {
    let auth = AdminAuth::new(None, SessionHub::new());
    let err = auth.sign_in("admin@rising.dz", "s3cret").await.unwrap_err();
    assert!(matches!(err, AuthError::Disabled));
}

#[tokio::test]
async fn sign_out_clears_session() {
    let auth = admin();
    auth.sign_in("admin@rising.dz", "s3cret").await.unwrap();
    auth.sign_out().await.unwrap();
    assert!(!auth.session().is_present());
    // Signing out twice is harmless.
    auth.sign_out().await.unwrap();
    assert!(!auth.session().is_present());
}
