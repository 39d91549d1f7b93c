//! Account service: registration, login, and email confirmation.

use std::sync::Arc;

use rolodex_auth::TokenSigner;
use tracing::warn;

use super::model::{AccessGrant, ConfirmationOutcome, Credentials, NewUser, User};
use super::repository::UserRepository;
use super::validation::validate_new_user;
use crate::error::{Error, Result};
use crate::mailer::ConfirmationMailer;

/// Orchestrates the account lifecycle.
///
/// Accounts are created unconfirmed and transition to confirmed exactly
/// once, by redeeming a confirmation token for their email address. Login
/// requires a confirmed account.
pub struct AccountService {
    users: UserRepository,
    signer: Arc<TokenSigner>,
    mailer: Arc<dyn ConfirmationMailer>,
}

impl AccountService {
    /// Creates a service over a user repository, token signer, and mailer.
    pub fn new(
        users: UserRepository,
        signer: Arc<TokenSigner>,
        mailer: Arc<dyn ConfirmationMailer>,
    ) -> Self {
        Self {
            users,
            signer,
            mailer,
        }
    }

    /// Registers a new, unconfirmed account and dispatches a confirmation
    /// email.
    ///
    /// The email leaves on a spawned task: the registration response never
    /// waits for delivery, and a delivery failure is logged, not surfaced.
    /// `base_url` is the host's public URL used to build the confirmation
    /// callback link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed input and
    /// [`Error::Conflict`] if the username or email is already registered.
    pub async fn register(&self, new_user: &NewUser, base_url: &str) -> Result<User> {
        validate_new_user(new_user).map_err(|errors| Error::validation(&errors))?;

        let password_hash = rolodex_auth::hash_password(&new_user.password)?;
        let user = self
            .users
            .create(&new_user.username, &new_user.email, &password_hash)
            .await?;

        self.dispatch_confirmation(&user, base_url);
        Ok(user)
    }

    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for an unknown username, a wrong
    /// password, or an account that has not confirmed its email. The three
    /// cases are indistinguishable to the caller.
    pub async fn login(&self, credentials: &Credentials) -> Result<AccessGrant> {
        let Some(user) = self.users.find_by_username(&credentials.username).await? else {
            return Err(Error::Unauthorized);
        };

        let password_ok = rolodex_auth::verify_password(&credentials.password, &user.password_hash)
            .map_err(|_| Error::Unauthorized)?;
        if !password_ok || !user.confirmed {
            return Err(Error::Unauthorized);
        }

        let token = self.signer.issue_access_token(&user.username)?;
        Ok(AccessGrant::new(token))
    }

    /// Redeems a confirmation token.
    ///
    /// Confirming an already-confirmed account is a no-op reported as
    /// [`ConfirmationOutcome::AlreadyConfirmed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the token is invalid or does not
    /// resolve to a known user; the two cases read the same to the caller.
    pub async fn confirm_email(&self, token: &str) -> Result<ConfirmationOutcome> {
        let email = self
            .signer
            .resolve_confirmation_token(token)
            .map_err(|_| Error::Validation("Verification error.".to_owned()))?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(Error::Validation("Verification error.".to_owned()));
        };

        if user.confirmed {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }

        self.users.mark_confirmed(&email).await?;
        Ok(ConfirmationOutcome::Confirmed)
    }

    /// Re-sends the confirmation email for a still-unconfirmed account.
    ///
    /// Always succeeds with the same outcome whether the address is unknown,
    /// unconfirmed, or already confirmed, so the endpoint cannot be used to
    /// probe which addresses have accounts. A mail is dispatched only for a
    /// known unconfirmed address, fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns an error only if the user lookup itself fails.
    pub async fn request_confirmation(&self, email: &str, base_url: &str) -> Result<()> {
        if let Some(user) = self.users.find_by_email(email).await?
            && !user.confirmed
        {
            self.dispatch_confirmation(&user, base_url);
        }
        Ok(())
    }

    /// Resolves a bearer token to the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] if the token fails verification or
    /// the user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let username = self
            .signer
            .verify_access_token(token)
            .map_err(|_| Error::Unauthorized)?;

        self.users
            .find_by_username(&username)
            .await?
            .ok_or(Error::Unauthorized)
    }

    /// Spawns the confirmation-mail dispatch; never awaited by request paths.
    fn dispatch_confirmation(&self, user: &User, base_url: &str) {
        let signer = Arc::clone(&self.signer);
        let mailer = Arc::clone(&self.mailer);
        let email = user.email.clone();
        let username = user.username.clone();
        let base_url = base_url.to_owned();

        tokio::spawn(async move {
            let token = match signer.issue_confirmation_token(&email) {
                Ok(token) => token,
                Err(err) => {
                    warn!(error = %err, "could not issue confirmation token");
                    return;
                }
            };

            if let Err(err) = mailer
                .send_confirmation(&email, &username, &base_url, &token)
                .await
            {
                warn!(error = %err, recipient = %email, "confirmation email dispatch failed");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

    use super::*;
    use crate::db::Database;
    use crate::mailer::MailerError;

    const BASE_URL: &str = "https://contacts.example.com";
    const SECRET: &str = "test-secret";

    /// A dispatched confirmation mail captured by the recording mailer.
    #[derive(Debug, Clone)]
    struct SentMail {
        to: String,
        username: String,
        token: String,
    }

    struct RecordingMailer {
        tx: UnboundedSender<SentMail>,
    }

    #[async_trait]
    impl ConfirmationMailer for RecordingMailer {
        async fn send_confirmation(
            &self,
            to: &str,
            username: &str,
            _base_url: &str,
            token: &str,
        ) -> std::result::Result<(), MailerError> {
            let _ = self.tx.send(SentMail {
                to: to.to_owned(),
                username: username.to_owned(),
                token: token.to_owned(),
            });
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl ConfirmationMailer for FailingMailer {
        async fn send_confirmation(
            &self,
            _to: &str,
            _username: &str,
            _base_url: &str,
            _token: &str,
        ) -> std::result::Result<(), MailerError> {
            Err(MailerError::Delivery("smtp down".to_owned()))
        }
    }

    async fn service() -> (AccountService, Mutex<UnboundedReceiver<SentMail>>) {
        let db = Database::in_memory().await.unwrap();
        let (tx, rx) = unbounded_channel();
        let service = AccountService::new(
            db.users(),
            Arc::new(TokenSigner::new(SECRET)),
            Arc::new(RecordingMailer { tx }),
        );
        (service, Mutex::new(rx))
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "hunter22".to_owned(),
        }
    }

    fn alice_login() -> Credentials {
        Credentials {
            username: "alice".to_owned(),
            password: "hunter22".to_owned(),
        }
    }

    async fn next_mail(rx: &Mutex<UnboundedReceiver<SentMail>>) -> SentMail {
        tokio::time::timeout(Duration::from_secs(5), rx.lock().await.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn register_dispatches_one_confirmation_mail() {
        let (service, rx) = service().await;
        let user = service.register(&alice(), BASE_URL).await.unwrap();
        assert!(!user.confirmed);

        let mail = next_mail(&rx).await;
        assert_eq!(mail.to, "alice@example.com");
        assert_eq!(mail.username, "alice");
    }

    #[tokio::test]
    async fn login_before_confirmation_is_unauthorized() {
        let (service, _rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();

        let result = service.login(&alice_login()).await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn confirm_then_login_then_authenticate() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();

        let mail = next_mail(&rx).await;
        let outcome = service.confirm_email(&mail.token).await.unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Confirmed);

        let grant = service.login(&alice_login()).await.unwrap();
        assert_eq!(grant.token_type, "bearer");

        let user = service.authenticate(&grant.access_token).await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.confirmed);
    }

    #[tokio::test]
    async fn confirming_twice_is_an_idempotent_no_op() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();

        let mail = next_mail(&rx).await;
        service.confirm_email(&mail.token).await.unwrap();

        let second = service.confirm_email(&mail.token).await.unwrap();
        assert_eq!(second, ConfirmationOutcome::AlreadyConfirmed);
    }

    #[tokio::test]
    async fn confirmation_token_for_unknown_user_rejected() {
        let (service, _rx) = service().await;
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .issue_confirmation_token("ghost@example.com")
            .unwrap();

        let result = service.confirm_email(&token).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn access_token_cannot_confirm_an_email() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();
        let mail = next_mail(&rx).await;
        service.confirm_email(&mail.token).await.unwrap();

        let grant = service.login(&alice_login()).await.unwrap();
        let result = service.confirm_email(&grant.access_token).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (service, _rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();

        let mut dup = alice();
        dup.email = "other@example.com".to_owned();
        let result = service.register(&dup, BASE_URL).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (service, _rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();

        let mut dup = alice();
        dup.username = "alicia".to_owned();
        let result = service.register(&dup, BASE_URL).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();
        let mail = next_mail(&rx).await;
        service.confirm_email(&mail.token).await.unwrap();

        let result = service
            .login(&Credentials {
                username: "alice".to_owned(),
                password: "wrong-password".to_owned(),
            })
            .await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn login_with_unknown_username_is_unauthorized() {
        let (service, _rx) = service().await;
        let result = service.login(&alice_login()).await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn request_confirmation_does_not_leak_account_existence() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();
        next_mail(&rx).await;

        // Known unconfirmed address: generic success, mail re-sent.
        service
            .request_confirmation("alice@example.com", BASE_URL)
            .await
            .unwrap();
        let mail = next_mail(&rx).await;
        assert_eq!(mail.to, "alice@example.com");

        // Unknown address: the same generic success, no mail.
        service
            .request_confirmation("ghost@example.com", BASE_URL)
            .await
            .unwrap();

        // Confirmed address: still the same generic success, no mail.
        service.confirm_email(&mail.token).await.unwrap();
        service
            .request_confirmation("alice@example.com", BASE_URL)
            .await
            .unwrap();

        let quiet = tokio::time::timeout(Duration::from_millis(200), rx.lock().await.recv()).await;
        assert!(quiet.is_err(), "no mail expected for these addresses");
    }

    #[tokio::test]
    async fn failing_mailer_does_not_fail_registration() {
        let db = Database::in_memory().await.unwrap();
        let service = AccountService::new(
            db.users(),
            Arc::new(TokenSigner::new(SECRET)),
            Arc::new(FailingMailer),
        );

        let user = service.register(&alice(), BASE_URL).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn invalid_registration_input_rejected_before_any_write() {
        let (service, _rx) = service().await;
        let result = service
            .register(
                &NewUser {
                    username: "a".to_owned(),
                    email: "not-an-email".to_owned(),
                    password: "pw".to_owned(),
                },
                BASE_URL,
            )
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        // Nothing was stored under either unique key.
        let retry = service.register(&alice(), BASE_URL).await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn tampered_access_token_is_unauthorized() {
        let (service, rx) = service().await;
        service.register(&alice(), BASE_URL).await.unwrap();
        let mail = next_mail(&rx).await;
        service.confirm_email(&mail.token).await.unwrap();

        let grant = service.login(&alice_login()).await.unwrap();
        let mut token = grant.access_token;
        token.push('x');

        let result = service.authenticate(&token).await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }
}
