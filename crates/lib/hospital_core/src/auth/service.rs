//! Authentication service: registration, login, profile and password flows.
//!
//! Password hashing is an explicit step of `register` and `change_password`;
//! no other path writes the hash column, so a stored hash is never hashed a
//! second time.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::password::{hash_password, verify_against_dummy, verify_password};
use super::{AuthError, MIN_PASSWORD_LEN, TokenIssuer};
use crate::models::auth::{
    AuthSession, ProfileChanges, PublicUser, Role, TokenIdentity, UserRecord,
};
use crate::store::CredentialStore;
use crate::uuid::new_id;

const REGISTER_FIELDS: &str = "Please provide email, password, first name and last name";
const PASSWORD_FIELDS: &str = "Please provide the current and the new password";
const PROFILE_FIELDS: &str = "First name and last name cannot be blank";

/// Registration input. Absent and blank fields are both "missing".
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

/// Composes the credential store, the password hasher and the token issuer.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account and sign the new user in.
    pub async fn register(&self, input: Registration) -> Result<AuthSession, AuthError> {
        let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
            non_blank(input.email),
            input.password.filter(|p| !p.is_empty()),
            non_blank(input.first_name),
            non_blank(input.last_name),
        ) else {
            return Err(AuthError::MissingFields(REGISTER_FIELDS));
        };

        let email = normalize_email(&email);
        if !looks_like_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        check_strength(&password)?;

        let role = match non_blank(input.role) {
            Some(role) => role
                .parse::<Role>()
                .map_err(|_| AuthError::InvalidRole(role))?,
            None => Role::default(),
        };

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&password).await?;
        let now = Utc::now();
        let user = self
            .store
            .insert_user(UserRecord {
                id: new_id(),
                email,
                password_hash,
                first_name,
                last_name,
                role,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        self.session_for(&user)
    }

    /// Authenticate with email + password.
    ///
    /// Unknown email and wrong password produce the same error. The active
    /// flag is only consulted once the password has matched.
    pub async fn login(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<AuthSession, AuthError> {
        let (Some(email), Some(password)) =
            (non_blank(email), password.filter(|p| !p.is_empty()))
        else {
            return Err(AuthError::MissingCredentials);
        };

        let email = normalize_email(&email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            verify_against_dummy(&password).await;
            warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&password, &user.password_hash).await? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        info!(user_id = %user.id, "user logged in");
        self.session_for(&user)
    }

    /// Verify a bearer token. Thin wrapper so callers only need the service.
    pub fn verify_token(&self, token: &str) -> Result<TokenIdentity, AuthError> {
        self.tokens.verify(token)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<PublicUser, AuthError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|u| u.public_view())
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply the supplied name fields and bump `updated_at`.
    pub async fn update_profile(
        &self,
        user_id: &str,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<PublicUser, AuthError> {
        let changes = ProfileChanges {
            first_name: supplied_non_blank(first_name, PROFILE_FIELDS)?,
            last_name: supplied_non_blank(last_name, PROFILE_FIELDS)?,
        };
        let user = self
            .store
            .update_profile(user_id, &changes, Utc::now())
            .await?
            .ok_or(AuthError::UserNotFound)?;
        info!(user_id = %user.id, "profile updated");
        Ok(user.public_view())
    }

    /// Replace the password after checking the current one.
    ///
    /// Tokens issued before the change stay valid until they expire.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: Option<String>,
        new_password: Option<String>,
    ) -> Result<(), AuthError> {
        let (Some(current), Some(new)) = (
            current_password.filter(|p| !p.is_empty()),
            new_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingFields(PASSWORD_FIELDS));
        };
        check_strength(&new)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&current, &user.password_hash).await? {
            warn!(user_id = %user.id, "password change rejected: wrong current password");
            return Err(AuthError::InvalidCurrentPassword);
        }

        let hash = hash_password(&new).await?;
        if !self
            .store
            .set_password_hash(&user.id, &hash, Utc::now())
            .await?
        {
            return Err(AuthError::UserNotFound);
        }
        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    /// Resolve the caller's role and check it against `allowed`. Disabled
    /// accounts pass no gate.
    pub async fn authorize(&self, user_id: &str, allowed: &[Role]) -> Result<Role, AuthError> {
        match self.store.find_user_by_id(user_id).await? {
            Some(user) if user.is_active && allowed.contains(&user.role) => Ok(user.role),
            Some(user) if !user.is_active => {
                warn!(user_id = %user.id, "role gate rejected disabled account");
                Err(AuthError::Forbidden)
            }
            Some(user) => {
                warn!(user_id = %user.id, role = %user.role, "role gate rejected request");
                Err(AuthError::Forbidden)
            }
            None => Err(AuthError::Forbidden),
        }
    }

    /// Enable or disable an account. Disabled accounts cannot log in.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<PublicUser, AuthError> {
        let user = self
            .store
            .set_active(user_id, is_active, Utc::now())
            .await?
            .ok_or(AuthError::UserNotFound)?;
        info!(user_id = %user.id, is_active, "account status changed");
        Ok(user.public_view())
    }

    fn session_for(&self, user: &UserRecord) -> Result<AuthSession, AuthError> {
        Ok(AuthSession {
            token: self.tokens.issue(&user.id, &user.email)?,
            user: user.public_view(),
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `None` stays `None`; a supplied value must not be blank.
fn supplied_non_blank(
    value: Option<String>,
    missing: &'static str,
) -> Result<Option<String>, AuthError> {
    match value {
        None => Ok(None),
        Some(v) => non_blank(Some(v))
            .map(Some)
            .ok_or(AuthError::MissingFields(missing)),
    }
}

fn check_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with no whitespace, at least one dot in the domain and
/// no empty domain label.
pub fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || domain.split('.').any(str::is_empty) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((_, tld)) => tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), TokenIssuer::new("test-secret"))
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: Some(email.into()),
            password: Some(password.into()),
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            role: None,
        }
    }

    #[tokio::test]
    async fn register_returns_token_and_public_user() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();

        assert_eq!(session.user.email, "a@x.com");
        assert_eq!(session.user.role, Role::Patient);
        assert!(session.user.is_active);
        let identity = auth.verify_token(&session.token).unwrap();
        assert_eq!(identity.user_id, session.user.id);
    }

    #[tokio::test]
    async fn register_stores_hash_that_verifies() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(store.clone(), TokenIssuer::new("test-secret"));
        auth.register(registration("a@x.com", "secret1")).await.unwrap();

        let stored = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash.as_str(), "secret1");
        assert!(verify_password("secret1", &stored.password_hash).await.unwrap());
    }

    #[tokio::test]
    async fn register_normalizes_email() {
        let auth = service();
        let session = auth
            .register(registration("  Mixed.Case@Example.COM ", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.user.email, "mixed.case@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_in_any_case_is_rejected() {
        let auth = service();
        auth.register(registration("a@x.com", "secret1")).await.unwrap();
        let err = auth
            .register(registration("A@X.COM", "another1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let auth = service();
        let mut input = registration("a@x.com", "secret1");
        input.last_name = Some("   ".into());
        assert!(matches!(
            auth.register(input).await,
            Err(AuthError::MissingFields(REGISTER_FIELDS))
        ));

        let input = Registration {
            email: Some("a@x.com".into()),
            password: Some("secret1".into()),
            ..Default::default()
        };
        assert!(matches!(
            auth.register(input).await,
            Err(AuthError::MissingFields(REGISTER_FIELDS))
        ));
    }

    #[tokio::test]
    async fn short_passwords_are_weak() {
        let auth = service();
        for pw in ["1", "12345", "äöü"] {
            assert!(matches!(
                auth.register(registration("a@x.com", pw)).await,
                Err(AuthError::WeakPassword)
            ));
        }
    }

    #[tokio::test]
    async fn register_rejects_bad_email_and_role() {
        let auth = service();
        assert!(matches!(
            auth.register(registration("not-an-email", "secret1")).await,
            Err(AuthError::InvalidEmail)
        ));

        let mut input = registration("a@x.com", "secret1");
        input.role = Some("janitor".into());
        assert!(matches!(
            auth.register(input).await,
            Err(AuthError::InvalidRole(r)) if r == "janitor"
        ));
    }

    #[tokio::test]
    async fn register_honours_requested_role() {
        let auth = service();
        let mut input = registration("doc@x.com", "secret1");
        input.role = Some("doctor".into());
        let session = auth.register(input).await.unwrap();
        assert_eq!(session.user.role, Role::Doctor);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let auth = service();
        let registered = auth.register(registration("a@x.com", "secret1")).await.unwrap();
        let session = auth
            .login(Some("A@x.com".into()), Some("secret1".into()))
            .await
            .unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let auth = service();
        auth.register(registration("a@x.com", "secret1")).await.unwrap();

        let wrong = auth
            .login(Some("a@x.com".into()), Some("wrong-pass".into()))
            .await
            .unwrap_err();
        let unknown = auth
            .login(Some("nobody@x.com".into()), Some("secret1".into()))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn login_requires_both_credentials() {
        let auth = service();
        assert!(matches!(
            auth.login(Some("a@x.com".into()), None).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login(None, Some("secret1".into())).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn disabled_account_cannot_login() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();
        auth.set_active(&session.user.id, false).await.unwrap();

        assert!(matches!(
            auth.login(Some("a@x.com".into()), Some("secret1".into())).await,
            Err(AuthError::AccountDisabled)
        ));
        // Without the password the account state is not revealed.
        assert!(matches!(
            auth.login(Some("a@x.com".into()), Some("wrong-pass".into())).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();

        let profile = auth.get_profile(&session.user.id).await.unwrap();
        assert_eq!(profile, session.user);

        let updated = auth
            .update_profile(&session.user.id, Some(" Ana ".into()), None)
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Ana");
        assert_eq!(updated.last_name, "B");
        assert!(updated.updated_at >= session.user.updated_at);
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_not_found() {
        let auth = service();
        assert!(matches!(
            auth.get_profile("missing").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.update_profile("missing", Some("X".into()), None).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn blank_profile_field_is_rejected() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();
        assert!(matches!(
            auth.update_profile(&session.user.id, Some("".into()), None).await,
            Err(AuthError::MissingFields(PROFILE_FIELDS))
        ));
    }

    #[tokio::test]
    async fn change_password_replaces_hash() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();

        auth.change_password(
            &session.user.id,
            Some("secret1".into()),
            Some("secret2".into()),
        )
        .await
        .unwrap();

        assert!(
            auth.login(Some("a@x.com".into()), Some("secret2".into()))
                .await
                .is_ok()
        );
        assert!(matches!(
            auth.login(Some("a@x.com".into()), Some("secret1".into())).await,
            Err(AuthError::InvalidCredentials)
        ));
        // The token from before the change keeps working.
        assert!(auth.verify_token(&session.token).is_ok());
    }

    #[tokio::test]
    async fn change_password_checks_inputs_and_current_password() {
        let auth = service();
        let session = auth.register(registration("a@x.com", "secret1")).await.unwrap();
        let id = session.user.id.as_str();

        assert!(matches!(
            auth.change_password(id, None, Some("secret2".into())).await,
            Err(AuthError::MissingFields(PASSWORD_FIELDS))
        ));
        assert!(matches!(
            auth.change_password(id, Some("secret1".into()), Some("123".into()))
                .await,
            Err(AuthError::WeakPassword)
        ));
        assert!(matches!(
            auth.change_password(id, Some("nope-nope".into()), Some("secret2".into()))
                .await,
            Err(AuthError::InvalidCurrentPassword)
        ));
        assert!(matches!(
            auth.change_password("missing", Some("secret1".into()), Some("secret2".into()))
                .await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn authorize_checks_role() {
        let auth = service();
        let mut input = registration("admin@x.com", "secret1");
        input.role = Some("admin".into());
        let admin = auth.register(input).await.unwrap();
        let patient = auth.register(registration("p@x.com", "secret1")).await.unwrap();

        assert_eq!(
            auth.authorize(&admin.user.id, &[Role::Admin]).await.unwrap(),
            Role::Admin
        );
        assert!(matches!(
            auth.authorize(&patient.user.id, &[Role::Admin, Role::Doctor]).await,
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(
            auth.authorize("missing", &[Role::Patient]).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("a@x.com"));
        assert!(looks_like_email("first.last@sub.example.org"));
        assert!(!looks_like_email("a@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a b@x.com"));
        assert!(!looks_like_email("a@@x.com"));
        assert!(!looks_like_email("a@.com"));
        assert!(!looks_like_email("a@x..com"));
        assert!(!looks_like_email("a@.x.com"));
        assert!(!looks_like_email("a@x.com."));
    }

    #[tokio::test]
    async fn disabled_account_fails_the_role_gate() {
        let auth = service();
        let mut input = registration("admin@x.com", "secret1");
        input.role = Some("admin".into());
        let admin = auth.register(input).await.unwrap();
        auth.set_active(&admin.user.id, false).await.unwrap();

        assert!(matches!(
            auth.authorize(&admin.user.id, &[Role::Admin]).await,
            Err(AuthError::Forbidden)
        ));

        auth.set_active(&admin.user.id, true).await.unwrap();
        assert_eq!(
            auth.authorize(&admin.user.id, &[Role::Admin]).await.unwrap(),
            Role::Admin
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_keep_one_account() {
        let auth = service();
        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let auth = auth.clone();
                tokio::spawn(async move {
                    auth.register(registration("race@x.com", "secret1")).await
                })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::DuplicateEmail) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
    }
}
