// src/web/pages.rs
//! HTML for the four pages, picked from a table keyed by `Page`.

use super::session::{Page, Session};
use super::types::Message;
use crate::store::{JobDescription, UserRecord};
use std::fmt::Write;
use std::path::Path;

pub struct PageContext<'a> {
    pub session: &'a Session,
    pub messages: &'a [Message],
    pub user: Option<&'a UserRecord>,
    pub jobs: &'a [JobDescription],
    pub jds_dir: &'a Path,
}

type Renderer = fn(&PageContext<'_>) -> String;

const RENDERERS: [(Page, &str, Renderer); 4] = [
    (Page::Login, "Login to AI Candidate Scorer", login_page),
    (Page::Signup, "Sign Up for AI Candidate Scorer", signup_page),
    (Page::SetupProfile, "Set Up Your Profile", setup_profile_page),
    (Page::ApplyForRoles, "Apply for Roles", apply_for_roles_page),
];

pub fn render(ctx: &PageContext<'_>) -> String {
    let (title, body) = RENDERERS
        .iter()
        .find(|(page, _, _)| *page == ctx.session.page)
        .map(|(_, title, renderer)| (*title, renderer(ctx)))
        .unwrap_or(("AI Candidate Scorer", String::new()));

    let mut messages = String::new();
    for message in ctx.messages {
        let _ = writeln!(
            messages,
            r#"<div class="message {}">{}</div>"#,
            message.class.as_str(),
            escape(&message.text)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>AI Candidate Scorer</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 60rem; }}
.message {{ padding: .5rem 1rem; margin: .5rem 0; border-radius: 4px; }}
.info {{ background: #e7f1fb; }}
.success {{ background: #e6f6e6; }}
.warning, .section {{ background: #fff6d6; }}
.error, .scoring {{ background: #fde8e8; }}
.reauth {{ background: #fde8e8; font-weight: bold; }}
pre {{ background: #f6f6f6; padding: 1rem; overflow-x: auto; }}
</style>
</head>
<body>
<h1>{}</h1>
{}{}
</body>
</html>
"#,
        escape(title),
        messages,
        body
    )
}

fn login_page(_ctx: &PageContext<'_>) -> String {
    r#"<p>Please enter your credentials to log in or create a new account.</p>
<form method="post" action="/login">
<label>Username or Email <input name="username"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Login</button>
</form>
<form method="get" action="/signup"><button type="submit">Sign Up (New User)</button></form>
"#
    .to_string()
}

fn signup_page(_ctx: &PageContext<'_>) -> String {
    r#"<p>Create your account to get started.</p>
<form method="post" action="/signup">
<label>Choose a Username or Email <input name="username"></label>
<label>Choose a Password <input name="password" type="password"></label>
<label>Confirm Password <input name="confirm_password" type="password"></label>
<button type="submit">Create Account</button>
</form>
<form method="get" action="/login"><button type="submit">Back to Login</button></form>
"#
    .to_string()
}

fn setup_profile_page(ctx: &PageContext<'_>) -> String {
    let name = ctx.user.and_then(|u| u.name.as_deref()).unwrap_or_default();
    let url = ctx.user.and_then(|u| u.linkedin_url.as_deref()).unwrap_or_default();

    format!(
        r#"<p>Please provide your name and LinkedIn profile URL to set up your profile.</p>
<form method="post" action="/profile">
<label>Your Name <input name="name" value="{}"></label>
<label>Your LinkedIn Profile URL <input name="linkedin_url" value="{}"></label>
<button type="submit">Save Profile and Continue</button>
</form>
{}"#,
        escape(name),
        escape(url),
        logout_form()
    )
}

fn apply_for_roles_page(ctx: &PageContext<'_>) -> String {
    let mut html = String::new();
    let display_name = ctx
        .user
        .and_then(|u| u.name.as_deref())
        .or(ctx.session.current_user.as_deref())
        .unwrap_or_default();
    let _ = writeln!(
        html,
        "<p>Welcome, <strong>{}</strong>! Select a job description to see your compatibility score.</p>",
        escape(display_name)
    );

    if ctx.jobs.is_empty() {
        let _ = writeln!(
            html,
            r#"<div class="message info">No Job Descriptions found in the '{}' folder. Please add some JD.json files (e.g., 'Senior_Software_Engineer_JD.json').</div>"#,
            escape(&ctx.jds_dir.display().to_string())
        );
    } else {
        html.push_str("<h2>Available Job Descriptions:</h2>\n");
    }

    for job in ctx.jobs {
        let pretty = serde_json::to_string_pretty(&job.data).unwrap_or_default();
        let _ = writeln!(
            html,
            r#"<details>
<summary><strong>{title}</strong> at <strong>{company}</strong></summary>
<pre>{json}</pre>
<form method="post" action="/apply">
<input type="hidden" name="jd_filename" value="{filename}">
<button type="submit">I'm interested in {title}</button>
</form>
</details>"#,
            title = escape(job.title()),
            company = escape(job.company()),
            json = escape(&pretty),
            filename = escape(&job.filename),
        );
    }

    html.push_str(&logout_form());
    html
}

fn logout_form() -> String {
    r#"<form method="post" action="/logout"><button type="submit">Logout</button></form>
"#
    .to_string()
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::types::MessageClass;
    use serde_json::json;

    fn ctx_for<'a>(session: &'a Session, messages: &'a [Message], jobs: &'a [JobDescription]) -> PageContext<'a> {
        PageContext {
            session,
            messages,
            user: None,
            jobs,
            jds_dir: Path::new("JDs"),
        }
    }

    #[test]
    fn test_every_page_has_a_renderer() {
        for page in [Page::Login, Page::Signup, Page::SetupProfile, Page::ApplyForRoles] {
            assert!(RENDERERS.iter().any(|(p, _, _)| *p == page));
        }
    }

    #[test]
    fn test_messages_are_classed_and_escaped() {
        let session = Session::default();
        let messages = vec![Message {
            class: MessageClass::Reauth,
            text: "<b>log in</b>".to_string(),
        }];
        let html = render(&ctx_for(&session, &messages, &[]));
        assert!(html.contains(r#"<div class="message reauth">&lt;b&gt;log in&lt;/b&gt;</div>"#));
        assert!(html.contains("<h1>Login to AI Candidate Scorer</h1>"));
    }

    #[test]
    fn test_apply_page_lists_jobs() {
        let session = Session {
            logged_in: true,
            current_user: Some("alice".to_string()),
            page: Page::ApplyForRoles,
            messages: Vec::new(),
        };
        let jobs = vec![JobDescription {
            filename: "backend.json".to_string(),
            data: json!({"job_title": "Backend Engineer", "company": "Acme"}),
        }];
        let html = render(&ctx_for(&session, &[], &jobs));
        assert!(html.contains("<strong>Backend Engineer</strong> at <strong>Acme</strong>"));
        assert!(html.contains(r#"name="jd_filename" value="backend.json""#));
        assert!(html.contains("Welcome, <strong>alice</strong>"));

        let empty = render(&ctx_for(&session, &[], &[]));
        assert!(empty.contains("No Job Descriptions found in the 'JDs' folder"));
    }
}
