//! End-to-end flow: register, confirm, login, then manage contacts.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use rolodex_auth::TokenSigner;
use rolodex_core::{
    AccountService, ConfirmationMailer, ConfirmationOutcome, ContactFilter, ContactPatch,
    ContactService, Credentials, Database, Error, MailerError, NewContact, NewUser,
};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

const BASE_URL: &str = "https://contacts.example.com";

struct RecordingMailer {
    tx: UnboundedSender<String>,
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send_confirmation(
        &self,
        _to: &str,
        _username: &str,
        _base_url: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        let _ = self.tx.send(token.to_owned());
        Ok(())
    }
}

struct Backend {
    accounts: AccountService,
    contacts: ContactService,
    tokens: Mutex<UnboundedReceiver<String>>,
}

async fn backend() -> Backend {
    let db = Database::in_memory().await.unwrap();
    let (tx, rx) = unbounded_channel();
    Backend {
        accounts: AccountService::new(
            db.users(),
            Arc::new(TokenSigner::new("integration-secret")),
            Arc::new(RecordingMailer { tx }),
        ),
        contacts: ContactService::new(db.contacts()),
        tokens: Mutex::new(rx),
    }
}

impl Backend {
    async fn next_confirmation_token(&self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.tokens.lock().await.recv())
            .await
            .unwrap()
            .unwrap()
    }
}

fn ada() -> NewContact {
    NewContact {
        firstname: "Ada".to_owned(),
        lastname: "Lovelace".to_owned(),
        birthday: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
        email: "ada@example.com".to_owned(),
        phone: "+44000000001".to_owned(),
        note: Some("analytical engines".to_owned()),
    }
}

#[tokio::test]
async fn full_backend_flow() {
    let backend = backend().await;

    // Register; the account starts unconfirmed and cannot log in.
    let user = backend
        .accounts
        .register(
            &NewUser {
                username: "carol".to_owned(),
                email: "carol@example.com".to_owned(),
                password: "hunter22".to_owned(),
            },
            BASE_URL,
        )
        .await
        .unwrap();
    assert!(!user.confirmed);

    let credentials = Credentials {
        username: "carol".to_owned(),
        password: "hunter22".to_owned(),
    };
    assert!(matches!(
        backend.accounts.login(&credentials).await,
        Err(Error::Unauthorized)
    ));

    // Redeem the emailed token, then log in.
    let token = backend.next_confirmation_token().await;
    assert_eq!(
        backend.accounts.confirm_email(&token).await.unwrap(),
        ConfirmationOutcome::Confirmed
    );

    let grant = backend.accounts.login(&credentials).await.unwrap();
    let me = backend
        .accounts
        .authenticate(&grant.access_token)
        .await
        .unwrap();
    assert_eq!(me.id, user.id);

    // Contact CRUD under the authenticated owner.
    let created = backend.contacts.create(me.id, &ada()).await.unwrap();
    let fetched = backend.contacts.get(me.id, created.id).await.unwrap();
    assert_eq!(fetched.email, "ada@example.com");

    let updated = backend
        .contacts
        .update(me.id, created.id, &ContactPatch::default().lastname("Byron"))
        .await
        .unwrap();
    assert_eq!(updated.lastname, "Byron");
    assert_eq!(updated.firstname, "Ada");

    let listed = backend
        .contacts
        .list(me.id, &ContactFilter::default().lastname("byron"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // The window query anchors at the live calendar date; a contact whose
    // birthday shares today's month and day always lands in the window.
    // Year 2000 is a leap year, so today's month/day always exists in it.
    let today = Local::now().date_naive();
    let birthday_today = backend
        .contacts
        .create(
            me.id,
            &NewContact {
                firstname: "Cake".to_owned(),
                lastname: "Day".to_owned(),
                birthday: NaiveDate::from_ymd_opt(2000, today.month(), today.day()).unwrap(),
                email: "cake@example.com".to_owned(),
                phone: "+44000000002".to_owned(),
                note: None,
            },
        )
        .await
        .unwrap();
    let window = backend.contacts.upcoming_birthdays(me.id, 1).await.unwrap();
    assert!(window.iter().any(|c| c.id == birthday_today.id));

    let deleted = backend.contacts.delete(me.id, created.id).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(matches!(
        backend.contacts.get(me.id, created.id).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn second_registration_for_same_username_conflicts() {
    let backend = backend().await;
    let new_user = NewUser {
        username: "carol".to_owned(),
        email: "carol@example.com".to_owned(),
        password: "hunter22".to_owned(),
    };
    backend.accounts.register(&new_user, BASE_URL).await.unwrap();

    let mut dup = new_user;
    dup.email = "carol2@example.com".to_owned();
    assert!(matches!(
        backend.accounts.register(&dup, BASE_URL).await,
        Err(Error::Conflict(_))
    ));
}
