//! HTML pages.
//!
//! Markup is assembled with `format!`; every interpolated value passes
//! through [`escape`] first.

use std::borrow::Cow;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

use crate::domain::{SessionRecord, UserSummary};

/// Content type of every page this service renders.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Escape text for inclusion in HTML bodies and quoted attributes.
///
/// # Examples
/// ```
/// use rolegate::inbound::http::views::escape;
///
/// assert_eq!(escape("<b>\"Ada\" & co</b>"), "&lt;b&gt;&quot;Ada&quot; &amp; co&lt;/b&gt;");
/// assert_eq!(escape("plain"), "plain");
/// ```
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Wrap a rendered page in a response with `status`.
pub fn html(status: StatusCode, page: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(HTML_CONTENT_TYPE)
        .body(page)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|message| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(message)))
        .unwrap_or_default()
}

/// Login form with an optional error banner.
pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Log in</h1>\n{banner}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n<p><a href=\"/signup\">Create an account</a></p>",
        banner = error_banner(error),
    );
    layout("Log in", &body)
}

/// Signup form with an optional error banner.
pub fn signup_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Sign up</h1>\n{banner}\
         <form method=\"post\" action=\"/signup\">\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign up</button>\n\
         </form>\n<p><a href=\"/login\">Already registered? Log in</a></p>",
        banner = error_banner(error),
    );
    layout("Sign up", &body)
}

/// Public index shown to anonymous visitors.
pub fn index_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Welcome</h1>\n{banner}\
         <p><a href=\"/login\">Log in</a> or <a href=\"/signup\">sign up</a>.</p>",
        banner = error_banner(error),
    );
    layout("Welcome", &body)
}

/// Landing page; `users` is only `Some` for admins.
pub fn landing_page(session: &SessionRecord, users: Option<&[UserSummary]>) -> String {
    let roster = users.map(user_table).unwrap_or_default();
    let body = format!(
        "<h1>Welcome, {username}</h1>\n\
         <p>Signed in as {email} ({role}).</p>\n{roster}\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>",
        username = escape(session.username.as_ref()),
        email = escape(session.email.as_ref()),
        role = session.role,
    );
    layout("Landing", &body)
}

fn user_table(users: &[UserSummary]) -> String {
    let rows: String = users
        .iter()
        .map(|user| {
            format!(
                "<tr><td>{id}</td><td>{username}</td><td>{email}</td><td>{role}</td></tr>\n",
                id = user.id,
                username = escape(user.username.as_ref()),
                email = escape(user.email.as_ref()),
                role = user.role,
            )
        })
        .collect();
    format!(
        "<h2>All users</h2>\n<table id=\"users\">\n\
         <tr><th>ID</th><th>Username</th><th>Email</th><th>Role</th></tr>\n{rows}</table>\n"
    )
}

/// Minimal error page.
pub fn error_page(status: StatusCode, message: &str, trace_id: Option<&str>) -> String {
    let trace = trace_id
        .map(|id| format!("<p class=\"trace\">Trace ID: {}</p>\n", escape(id)))
        .unwrap_or_default();
    let body = format!(
        "<h1>{code}</h1>\n<p>{message}</p>\n{trace}<p><a href=\"/\">Home</a></p>",
        code = status.as_u16(),
        message = escape(message),
    );
    layout(status.canonical_reason().unwrap_or("Error"), &body)
}
