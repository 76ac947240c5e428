//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal in [`SessionRecord`]s: establish
//! one on login, read it on every page, destroy it on logout.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionRecord};

pub(crate) const SESSION_RECORD_KEY: &str = "account";

/// Newtype wrapper exposing the session lifecycle.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Start an authenticated session for `record`.
    ///
    /// The session key is renewed first so a pre-login cookie never carries
    /// over into the authenticated state.
    pub fn establish(&self, record: &SessionRecord) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SESSION_RECORD_KEY, record)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current session record, if the request is authenticated.
    ///
    /// An undecodable record is logged and treated as anonymous.
    pub fn record(&self) -> Option<SessionRecord> {
        self.0
            .get::<SessionRecord>(SESSION_RECORD_KEY)
            .unwrap_or_else(|error| {
                warn!("unreadable session record: {error}");
                None
            })
    }

    /// End the session.
    ///
    /// The session middleware deletes the server-side entry and expires the
    /// cookie once the handler returns; a failed delete becomes a 500.
    pub fn destroy(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
