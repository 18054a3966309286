// src/web/handlers.rs
use super::pages::{self, PageContext};
use super::session::{transition, Event, Page, Session};
use super::types::{ApplyForm, LoginForm, MessageClass, ProfileForm, SignupForm, WebState};
use crate::linkedin::{SavedProfile, ScrapeError};
use crate::scoring::fit_note;
use crate::store::{ApplicationRow, JobDescription, UserStoreError, UserStoreFailure};
use anyhow::Context;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::State;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn index_handler(cookies: &CookieJar<'_>, state: &State<WebState>) -> RawHtml<String> {
    let mut session = Session::from_cookies(cookies);

    let user = match session.user() {
        Some(username) => match state.users.get(username).await {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to load user {}: {:#}", username, e);
                None
            }
        },
        None => None,
    };

    if session.page.requires_login() && user.is_none() {
        session.push(MessageClass::Error, UserStoreError::UnknownUser.to_string());
        session = transition(session, Event::SessionLost);
    }

    if session.page == Page::ApplyForRoles {
        match user.as_ref().and_then(|u| u.linkedin_url.clone()) {
            None => {
                session.push(MessageClass::Warning, "Please complete your profile setup first.");
                session = transition(session, Event::ProfileMissing);
            }
            Some(url) => {
                if !state.profiles.exists(&url).await {
                    session.push(
                        MessageClass::Error,
                        format!(
                            "Your LinkedIn data ({}) was not found. Please re-do profile setup to generate it.",
                            state.profiles.path_for(&url).display()
                        ),
                    );
                    session = transition(session, Event::ProfileMissing);
                }
            }
        }
    }

    let jobs = if session.page == Page::ApplyForRoles {
        state.jobs.list().await.unwrap_or_else(|e| {
            error!("Failed to list job descriptions: {:#}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };

    let messages = session.take_messages();
    let html = pages::render(&PageContext {
        session: &session,
        messages: &messages,
        user: user.as_ref(),
        jobs: &jobs,
        jds_dir: state.jobs.dir(),
    });
    session.store(cookies);
    RawHtml(html)
}

pub fn navigate_handler(cookies: &CookieJar<'_>, event: Event) -> Redirect {
    let session = transition(Session::from_cookies(cookies), event);
    session.store(cookies);
    Redirect::to("/")
}

pub async fn login_handler(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let mut session = Session::from_cookies(cookies);

    match state.users.authenticate(&form.username, &form.password).await {
        Ok(Some(user)) => {
            let has_profile = match user.linkedin_url.as_deref() {
                Some(url) => state.profiles.exists(url).await,
                None => false,
            };
            info!("User {} logged in", form.username);
            session = transition(
                session,
                Event::LoggedIn {
                    username: form.username.clone(),
                    has_profile,
                },
            );
        }
        Ok(None) => session.push(MessageClass::Error, "Invalid username/email or password."),
        Err(e) => {
            error!("Failed to read user store: {:#}", e);
            session.push(MessageClass::Error, "Could not read user data. Please try again.");
        }
    }

    session.store(cookies);
    Redirect::to("/")
}

pub async fn signup_handler(
    form: Form<SignupForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let mut session = Session::from_cookies(cookies);
    let username = form.username.trim();

    match state
        .users
        .sign_up(username, &form.password, &form.confirm_password)
        .await
    {
        Ok(()) => {
            session.push(
                MessageClass::Success,
                "Account created successfully! Please proceed to set up your profile.",
            );
            session = transition(
                session,
                Event::SignedUp {
                    username: username.to_string(),
                },
            );
        }
        Err(UserStoreFailure::Invalid(e)) => session.push(MessageClass::Error, e.to_string()),
        Err(UserStoreFailure::Io(e)) => {
            error!("Failed to create account {}: {:#}", username, e);
            session.push(MessageClass::Error, "Could not create the account. Please try again.");
        }
    }

    session.store(cookies);
    Redirect::to("/")
}

pub async fn save_profile_handler(
    form: Form<ProfileForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let mut session = Session::from_cookies(cookies);
    let Some(username) = session.user().map(str::to_string) else {
        session.store(cookies);
        return Redirect::to("/");
    };

    let name = form.name.trim();
    let linkedin_url = form.linkedin_url.trim();

    match state.users.save_profile(&username, name, linkedin_url).await {
        Ok(_) => {
            if state.profiles.exists(linkedin_url).await {
                session.push(
                    MessageClass::Success,
                    "Profile saved! LinkedIn data already exists. Redirecting to job applications...",
                );
                session = transition(session, Event::ProfileReady);
            } else {
                info!("No scraped data for {}, scraping", linkedin_url);
                match run_scrape(state.scraper.clone(), linkedin_url.to_string()).await {
                    Ok(saved) => {
                        for notice in &saved.report.notices {
                            session.push(MessageClass::Section, notice.message());
                        }
                        session.push(MessageClass::Success, "LinkedIn profile data scraped and saved!");
                        session = transition(session, Event::ProfileReady);
                    }
                    Err(e) if is_reauth(&e) => {
                        error!("Scraper is not logged in: {:#}", e);
                        session.push(
                            MessageClass::Reauth,
                            "The scraper could not sign in to LinkedIn. Please log in again.",
                        );
                    }
                    Err(e) => {
                        error!("Scrape of {} failed: {:#}", linkedin_url, e);
                        session.push(
                            MessageClass::Error,
                            "Failed to scrape LinkedIn data. Please try again.",
                        );
                    }
                }
            }
        }
        Err(UserStoreFailure::Invalid(UserStoreError::UnknownUser)) => {
            session.push(MessageClass::Error, UserStoreError::UnknownUser.to_string());
            session = transition(session, Event::SessionLost);
        }
        Err(UserStoreFailure::Invalid(e)) => session.push(MessageClass::Error, e.to_string()),
        Err(UserStoreFailure::Io(e)) => {
            error!("Failed to save profile for {}: {:#}", username, e);
            session.push(MessageClass::Error, "Could not save your profile. Please try again.");
        }
    }

    session.store(cookies);
    Redirect::to("/")
}

async fn run_scrape(
    scraper: Arc<super::types::ScrapeFn>,
    url: String,
) -> anyhow::Result<SavedProfile> {
    tokio::task::spawn_blocking(move || (*scraper)(&url))
        .await
        .context("Scrape worker stopped unexpectedly")?
}

fn is_reauth(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<ScrapeError>(), Some(ScrapeError::NotLoggedIn))
}

pub async fn apply_handler(
    form: Form<ApplyForm>,
    cookies: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let mut session = Session::from_cookies(cookies);
    let Some(username) = session.user().map(str::to_string) else {
        session.store(cookies);
        return Redirect::to("/");
    };

    let profile_url = match state.users.get(&username).await {
        Ok(user) => user.and_then(|u| u.linkedin_url),
        Err(e) => {
            error!("Failed to load user {}: {:#}", username, e);
            None
        }
    };
    let Some(profile_url) = profile_url else {
        session.push(MessageClass::Warning, "Please complete your profile setup first.");
        session = transition(session, Event::ProfileMissing);
        session.store(cookies);
        return Redirect::to("/");
    };

    let candidate = match state.profiles.load_json(&profile_url).await {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!("Profile data for {} unusable: {:#}", profile_url, e);
            session.push(
                MessageClass::Error,
                format!(
                    "Error loading your LinkedIn data from {}. The file might be corrupted. Please re-do profile setup.",
                    state.profiles.path_for(&profile_url).display()
                ),
            );
            session = transition(session, Event::ProfileMissing);
            session.store(cookies);
            return Redirect::to("/");
        }
    };

    let job = match state.jobs.load(&form.jd_filename).await {
        Ok(data) => JobDescription {
            filename: form.jd_filename.clone(),
            data,
        },
        Err(e) => {
            warn!("Skipping job description {}: {:#}", form.jd_filename, e);
            session.push(
                MessageClass::Error,
                format!("Skipping malformed JD file: {}", form.jd_filename),
            );
            session.store(cookies);
            return Redirect::to("/");
        }
    };

    let score = match state.scorer.score(&job.data, &candidate).await {
        Ok(score) => {
            session.push(
                MessageClass::Success,
                format!("Your Score for {}: {}/100", job.title(), score),
            );
            if let Some(note) = fit_note(score) {
                let class = if score >= 80 {
                    MessageClass::Success
                } else {
                    MessageClass::Warning
                };
                session.push(class, note);
            }
            Some(score)
        }
        Err(e) => {
            warn!("Scoring {} for {} failed: {}", job.filename, profile_url, e);
            session.push(
                MessageClass::Scoring,
                "Failed to generate score for this role. Please try again.",
            );
            None
        }
    };

    let row = ApplicationRow {
        user_linkedin_url: profile_url,
        job_title: job.title().to_string(),
        jd_filename: job.filename.clone(),
        score,
    };
    if let Err(e) = state.applications.append(&row).await {
        error!("Failed to log application: {:#}", e);
    }

    session.store(cookies);
    Redirect::to("/")
}

pub fn logout_handler(cookies: &CookieJar<'_>) -> Redirect {
    navigate_handler(cookies, Event::Logout)
}
