// Portal session and generic paginated fetch
//
// The portal has no API surface of its own: everything goes through
// `POST index.php` as multipart form data, authenticated by a session
// cookie obtained from a CSRF-protected login form. Success and failure
// are signaled through the landing URL after redirects, not through
// status codes, so both the login flow and the fetch loop inspect
// `response.url()` rather than the body.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::StatusCode;
use reqwest::multipart::Form;
use scraper::{Html, Selector};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::models::Pagination;
use crate::pagination::{PaginationRequest, extract_path};
use crate::transport::TransportConfig;

/// Re-login attempts allowed when the portal logs the session out
/// between paginated requests (cookies aging out is the one transient
/// auth condition seen in practice).
const MAX_RETRIES: u32 = 3;

/// One authenticated session against the portal.
///
/// Owns its cookie jar exclusively; callers never see or mutate the
/// session cookies. One live session per configured account — the
/// caller serializes use, no internal locking is needed.
pub struct PortalSession {
    http: reqwest::Client,
    base_url: Url,
    index_url: Url,
    username: String,
    password: SecretString,
    signed_in: AtomicBool,
}

impl PortalSession {
    /// Create a new session from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is
    /// created automatically (the portal's auth is cookie-backed).
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        let index_url = base_url.join("index.php")?;
        Ok(Self {
            http,
            base_url,
            index_url,
            username,
            password,
            signed_in: AtomicBool::new(false),
        })
    }

    /// The portal base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a sign-in has succeeded and has not been closed since.
    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::Acquire)
    }

    // ── Sign-in ──────────────────────────────────────────────────────

    /// Authenticate against the portal.
    ///
    /// Fetches the login page, extracts the `csrftoken` hidden field,
    /// and submits the multipart login form. The portal answers every
    /// login attempt with a redirect; the only success signal is the
    /// landing URL carrying the authenticated `module=Home` marker.
    ///
    /// Idempotent: safe to call again after the portal expires the
    /// session cookies mid-sequence.
    pub async fn sign_in(&self) -> Result<(), Error> {
        debug!("signing in at {}", self.base_url);

        let resp = self
            .http
            .get(self.index_url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;
        let html = resp.text().await.map_err(Error::Transport)?;

        let csrftoken = extract_csrf_token(&html).ok_or_else(|| Error::Protocol {
            message: "csrftoken hidden field not found on login page".into(),
        })?;

        let form = Form::new()
            .text("module", "Usuarios")
            .text("user_name", self.username.clone())
            .text("user_password", self.password.expose_secret().to_owned())
            .text("action", "Login")
            .text("Login", "Login")
            .text("login_language", "en_gb")
            .text("resolucion", "")
            .text("token", "")
            .text("hashDevice", "")
            .text("csrftoken", csrftoken);

        let resp = self
            .http
            .post(self.index_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        if resp.url().as_str().contains("module=Home") {
            self.signed_in.store(true, Ordering::Release);
            info!("signed in to {}", self.base_url);
            Ok(())
        } else {
            self.signed_in.store(false, Ordering::Release);
            warn!("login rejected by {}", self.base_url);
            Err(Error::InvalidCredentials)
        }
    }

    // ── Generic paginated fetch ──────────────────────────────────────

    /// Fetch every page of a paginated AJAX endpoint and return the
    /// concatenated item arrays, in page order.
    ///
    /// Endpoint-agnostic: the descriptor's dot-path is the only thing
    /// that differs between endpoints. A response landing back on the
    /// login action means the session cookies expired; the same page is
    /// retried after a re-login, at most [`MAX_RETRIES`] times. HTTP 403
    /// is a hard credential rejection and is never retried. Any failure
    /// discards the items accumulated so far.
    pub async fn fetch_paginated(&self, request: &PaginationRequest) -> Result<Vec<Value>, Error> {
        if !self.is_signed_in() {
            self.sign_in().await?;
        }

        let mut params = request.params.clone();
        let mut offset = params
            .get("offset")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let limit = params
            .get("limit")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::from(request.page_size));

        let mut items: Vec<Value> = Vec::new();
        let mut retries: u32 = 0;

        loop {
            params.insert("offset".into(), Value::from(offset));
            params.insert("limit".into(), Value::from(limit));
            let params_json =
                serde_json::to_string(&params).map_err(|e| Error::MalformedResponse {
                    message: format!("failed to encode request params: {e}"),
                })?;

            debug!(
                module = %request.module,
                function = %request.function_name,
                offset,
                limit,
                "fetching page"
            );

            let form = Form::new()
                .text("module", request.module.clone())
                .text("action", request.action.clone())
                .text("functionName", request.function_name.clone())
                .text("params", params_json);

            let resp = self
                .http
                .post(self.index_url.clone())
                .multipart(form)
                .send()
                .await
                .map_err(Error::Transport)?;

            // An expired session redirects to the login action instead
            // of answering the AJAX call.
            if is_logged_out(resp.url()) {
                if retries >= MAX_RETRIES {
                    return Err(Error::AuthenticationRequired { attempts: retries });
                }
                retries += 1;
                warn!(retry = retries, "logged out of portal, re-signing in");
                self.signed_in.store(false, Ordering::Release);
                self.sign_in().await?;
                continue; // retry the same page
            }

            let status = resp.status();
            if status == StatusCode::FORBIDDEN {
                return Err(Error::InvalidCredentials);
            }
            if status != StatusCode::OK {
                return Err(Error::UnexpectedStatus {
                    status: status.as_u16(),
                });
            }

            let body = resp.text().await.map_err(Error::Transport)?;
            let data: Value =
                serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
                    message: format!("response body is not JSON: {e}"),
                })?;

            let page_items = extract_path(&data, &request.data_path)
                .and_then(Value::as_array)
                .ok_or_else(|| Error::MalformedResponse {
                    message: format!("no item array at path `{}`", request.data_path),
                })?;
            items.extend(page_items.iter().cloned());

            let Some(raw_pagination) = data.get("pagination") else {
                break;
            };
            let pagination: Pagination = serde_json::from_value(raw_pagination.clone())
                .map_err(|e| Error::MalformedResponse {
                    message: format!("unreadable pagination object: {e}"),
                })?;
            if !pagination.has_next_page {
                break;
            }
            // The portal reports the running item count in `total` and
            // its own frontend feeds that back as the next offset.
            // There is no other offset field, so preserve the quirk.
            offset = pagination.total;
        }

        debug!(
            count = items.len(),
            function = %request.function_name,
            "pagination complete"
        );
        Ok(items)
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Release the session. Safe to call when never signed in.
    ///
    /// The cookie jar is owned by this session and dropped with it;
    /// closing marks the session signed-out so a later call sequence
    /// starts from a fresh sign-in.
    pub fn close(&self) {
        if self.signed_in.swap(false, Ordering::AcqRel) {
            debug!("portal session closed");
        }
    }
}

/// Landing on `action=Login` means the portal bounced us to the login
/// screen: the session cookies are no longer valid.
fn is_logged_out(url: &Url) -> bool {
    url.as_str().contains("action=Login")
}

/// Pull the `csrftoken` hidden input's value out of the login page.
///
/// Sync on purpose: `scraper`'s DOM types are not `Send`, so keeping
/// them out of async fns keeps the session futures spawnable.
fn extract_csrf_token(html: &str) -> Option<String> {
    let selector = Selector::parse(r#"input[type="hidden"][name="csrftoken"]"#).ok()?;
    let document = Html::parse_document(html);
    let input = document.select(&selector).next()?;
    input.value().attr("value").map(str::to_owned)
}
