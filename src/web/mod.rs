// src/web/mod.rs
//! Rocket front end: login, signup, profile setup and job applications.

pub mod handlers;
pub mod pages;
pub mod session;
pub mod types;

pub use session::{transition, Event, Page, Session};
pub use types::*;

use anyhow::Result;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{catchers, get, post, routes, Build, Rocket, State};
use tracing::info;

#[get("/")]
pub async fn index(cookies: &CookieJar<'_>, state: &State<WebState>) -> RawHtml<String> {
    handlers::index_handler(cookies, state).await
}

#[get("/signup")]
pub fn show_signup(cookies: &CookieJar<'_>) -> Redirect {
    handlers::navigate_handler(cookies, Event::ShowSignup)
}

#[get("/login")]
pub fn show_login(cookies: &CookieJar<'_>) -> Redirect {
    handlers::navigate_handler(cookies, Event::ShowLogin)
}

#[post("/login", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::login_handler(form, cookies, state).await
}

#[post("/signup", data = "<form>")]
pub async fn signup(
    form: Form<SignupForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::signup_handler(form, cookies, state).await
}

#[post("/profile", data = "<form>")]
pub async fn save_profile(
    form: Form<ProfileForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::save_profile_handler(form, cookies, state).await
}

#[post("/apply", data = "<form>")]
pub async fn apply(
    form: Form<ApplyForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::apply_handler(form, cookies, state).await
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Redirect {
    handlers::logout_handler(cookies)
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

// Error catchers
#[rocket::catch(404)]
pub fn not_found() -> RawHtml<&'static str> {
    RawHtml(r#"<p>Page not found. <a href="/">Back to start</a></p>"#)
}

#[rocket::catch(422)]
pub fn unprocessable() -> RawHtml<&'static str> {
    RawHtml(r#"<p>The form was incomplete. <a href="/">Back to start</a></p>"#)
}

#[rocket::catch(500)]
pub fn internal_error() -> RawHtml<&'static str> {
    RawHtml(r#"<p>Internal server error. Try again in a few moments. <a href="/">Back to start</a></p>"#)
}

pub fn build_rocket(state: WebState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .register("/", catchers![not_found, unprocessable, internal_error])
        .mount(
            "/",
            routes![
                index,
                show_signup,
                show_login,
                login,
                signup,
                save_profile,
                apply,
                logout,
                health,
            ],
        )
}

pub async fn start_web_server(state: WebState) -> Result<()> {
    info!("Starting AI Candidate Scorer web server");
    info!("Profiles: {}", state.profiles.dir().display());
    info!("Job descriptions: {}", state.jobs.dir().display());

    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Web server failed: {}", e))?;

    Ok(())
}
