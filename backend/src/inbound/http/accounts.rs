//! Account page handlers.
//!
//! ```text
//! GET  /            index, or 302 to /landing with a session
//! GET  /login       login form (?error=...)
//! POST /login       email, password -> 303 /landing | 400 form
//! GET  /signup      signup form (?error=...)
//! POST /signup      username, email, password -> 303 / | 400 form
//! GET  /landing     role-gated landing page, or 302 to /login
//! POST /logout      303 / | 500
//! ```
//!
//! Form failures re-render the form with status 400 and a message; they are
//! never turned into redirects. Bodies missing a field get the generic 400
//! error page from [`form_rejection`].

use std::fmt;

use actix_web::error::UrlencodedError;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    Error, LoginCredentials, LoginError, SessionRecord, SignupDetails, SignupError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

/// Optional `?error=` message shown above a form.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    /// Message to display.
    pub error: Option<String>,
}

/// `POST /login` form body.
#[derive(Deserialize, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /signup` form body.
#[derive(Deserialize, Serialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Message on the error page for a form body that fails to decode.
pub const INCOMPLETE_FORM_MESSAGE: &str = "The submitted form was incomplete.";

/// Turn an undecodable form body into an `InvalidRequest` error page.
pub fn form_rejection(error: &UrlencodedError) -> actix_web::Error {
    debug!(%error, "form body rejected");
    Error::invalid_request(INCOMPLETE_FORM_MESSAGE).into()
}

fn redirect(status: StatusCode, location: &str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Render the public index, or send signed-in visitors to their landing page.
#[get("/")]
pub async fn index(session: SessionContext, query: web::Query<ErrorQuery>) -> HttpResponse {
    if session.record().is_some() {
        return redirect(StatusCode::FOUND, "/landing");
    }
    views::html(StatusCode::OK, views::index_page(query.error.as_deref()))
}

/// Render the login form.
#[get("/login")]
pub async fn login_form(query: web::Query<ErrorQuery>) -> HttpResponse {
    views::html(StatusCode::OK, views::login_page(query.error.as_deref()))
}

/// Verify credentials and start a session.
///
/// Unknown emails and wrong passwords produce the same 400 page.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let LoginForm { email, password } = form.into_inner();
    let credentials = LoginCredentials::new(email, password);

    match state.accounts.login(&credentials).await {
        Ok(user) => {
            session.establish(&SessionRecord::from(&user))?;
            Ok(redirect(StatusCode::SEE_OTHER, "/landing"))
        }
        Err(err @ LoginError::InvalidCredentials) => Ok(views::html(
            StatusCode::BAD_REQUEST,
            views::login_page(Some(&err.to_string())),
        )),
        Err(LoginError::Internal(error)) => Err(error),
    }
}

/// Render the signup form.
#[get("/signup")]
pub async fn signup_form(query: web::Query<ErrorQuery>) -> HttpResponse {
    views::html(StatusCode::OK, views::signup_page(query.error.as_deref()))
}

/// Register a `user` account. Does not log the new account in.
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    form: web::Form<SignupForm>,
) -> ApiResult<HttpResponse> {
    let SignupForm {
        username,
        email,
        password,
    } = form.into_inner();
    let details = SignupDetails::new(username, email, password);

    match state.accounts.signup(&details).await {
        Ok(_) => Ok(redirect(StatusCode::SEE_OTHER, "/")),
        Err(err @ (SignupError::UsernameTaken | SignupError::EmailTaken)) => Ok(views::html(
            StatusCode::BAD_REQUEST,
            views::signup_page(Some(&err.to_string())),
        )),
        Err(SignupError::Internal(error)) => Err(error),
    }
}

/// Landing page. Admins additionally see every registered account.
#[get("/landing")]
pub async fn landing(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(record) = session.record() else {
        return Ok(redirect(StatusCode::FOUND, "/login"));
    };
    let users = state.accounts.visible_users(&record).await?;
    Ok(views::html(
        StatusCode::OK,
        views::landing_page(&record, users.as_deref()),
    ))
}

/// End the session and return to the index.
///
/// Anonymous callers are redirected all the same.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    if let Some(record) = session.record() {
        info!(username = %record.username, "logged out");
    }
    session.destroy();
    redirect(StatusCode::SEE_OTHER, "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::inbound::http::configure_accounts;
    use crate::inbound::http::test_utils::{
        seeded_state, session_middleware_over, test_session_middleware,
    };
    use crate::outbound::InMemorySessionStore;
    use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
    use actix_web::cookie::Cookie;
    use actix_web::cookie::time::Duration;
    use actix_web::dev::ServiceResponse;
    use actix_web::{App, test};
    use rstest::rstest;

    /// Working session storage whose deletes always fail.
    #[derive(Clone, Default)]
    struct UndeletableSessions(InMemorySessionStore);

    impl SessionStore for UndeletableSessions {
        async fn load(
            &self,
            session_key: &SessionKey,
        ) -> Result<Option<HashMap<String, String>>, LoadError> {
            self.0.load(session_key).await
        }

        async fn save(
            &self,
            session_state: HashMap<String, String>,
            ttl: &Duration,
        ) -> Result<SessionKey, SaveError> {
            self.0.save(session_state, ttl).await
        }

        async fn update(
            &self,
            session_key: SessionKey,
            session_state: HashMap<String, String>,
            ttl: &Duration,
        ) -> Result<SessionKey, UpdateError> {
            self.0.update(session_key, session_state, ttl).await
        }

        async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> anyhow::Result<()> {
            self.0.update_ttl(session_key, ttl).await
        }

        async fn delete(&self, _session_key: &SessionKey) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("session backend offline"))
        }
    }

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(test_session_middleware())
            .configure(configure_accounts)
    }

    fn location(res: &ServiceResponse) -> Option<&str> {
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(Cookie::into_owned)
    }

    async fn body_text(res: ServiceResponse) -> String {
        let bytes = test::read_body(res).await;
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[actix_web::test]
    async fn admin_login_reaches_landing_with_user_list() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form(LoginForm {
                    email: "admin@example.com".into(),
                    password: "admin123".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&login_res), Some("/landing"));
        let cookie = session_cookie(&login_res).expect("session cookie");

        let landing_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/landing")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(landing_res.status(), StatusCode::OK);
        let body = body_text(landing_res).await;
        assert!(body.contains("AdminUser"));
        assert!(body.contains("RegularUser"));
        assert!(!body.contains("$2"), "hashes never reach the page");
    }

    #[rstest]
    #[case("admin@example.com", "wrong")]
    #[case("ghost@example.com", "admin123")]
    #[actix_web::test]
    async fn failed_login_rerenders_form(#[case] email: &str, #[case] password: &str) {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form(LoginForm {
                    email: email.into(),
                    password: password.into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&res).is_none());
        assert!(body_text(res).await.contains("Invalid username or password."));
    }

    #[actix_web::test]
    async fn signup_redirects_home_without_session() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/signup")
                .set_form(SignupForm {
                    username: "ada".into(),
                    email: "ada@example.com".into(),
                    password: "lovelace".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/"));
        assert!(session_cookie(&res).is_none());
    }

    #[rstest]
    #[case("AdminUser", "new@example.com", "Username is already taken.")]
    #[case("newcomer", "user@example.com", "Email is already registered.")]
    #[actix_web::test]
    async fn duplicate_signup_rerenders_form(
        #[case] username: &str,
        #[case] email: &str,
        #[case] message: &str,
    ) {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/signup")
                .set_form(SignupForm {
                    username: username.into(),
                    email: email.into(),
                    password: "pw".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains(message));
    }

    #[actix_web::test]
    async fn anonymous_landing_redirects_to_login() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/landing").to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), Some("/login"));
    }

    #[rstest]
    #[case("/login", "Bad+things", "Bad things")]
    #[case("/signup", "%3Cb%3E", "&lt;b&gt;")]
    #[case("/", "Try+again", "Try again")]
    #[actix_web::test]
    async fn forms_echo_escaped_error_query(
        #[case] path: &str,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("{path}?error={raw}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains(expected));
    }

    #[actix_web::test]
    async fn logout_fails_when_the_session_cannot_be_deleted() {
        let app = test::init_service(
            App::new()
                .app_data(seeded_state().await)
                .wrap(session_middleware_over(UndeletableSessions::default()))
                .configure(configure_accounts),
        )
        .await;
        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form(LoginForm {
                    email: "user@example.com".into(),
                    password: "user123".into(),
                })
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&login_res).expect("session cookie");

        let status = match test::try_call_service(
            &app,
            test::TestRequest::post()
                .uri("/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await
        {
            Ok(res) => res.status(),
            Err(error) => error.error_response().status(),
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    #[case("/login", "email=admin%40example.com")]
    #[case("/signup", "username=ada&password=pw")]
    #[actix_web::test]
    async fn incomplete_forms_get_the_error_page(#[case] path: &str, #[case] body: &str) {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(path)
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload(body.to_owned())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains(INCOMPLETE_FORM_MESSAGE));
    }

    #[rstest]
    #[core::prelude::v1::test]
    fn form_debug_output_hides_passwords() {
        let login_input = LoginForm {
            email: "admin@example.com".into(),
            password: "admin123".into(),
        };
        let signup_input = SignupForm {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "lovelace".into(),
        };
        let rendered = format!("{login_input:?} {signup_input:?}");
        assert!(rendered.contains("admin@example.com"));
        assert!(!rendered.contains("admin123"));
        assert!(!rendered.contains("lovelace"));
    }

    #[actix_web::test]
    async fn logout_without_session_still_redirects() {
        let app = test::init_service(test_app(seeded_state().await)).await;
        let res =
            test::call_service(&app, test::TestRequest::post().uri("/logout").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/"));
    }
}
