use std::sync::Arc;

use reqwest::{multipart, Client, StatusCode};
use shared::{
    domain::{Listing, UserProfile},
    error::ApiError,
    protocol::{SigninRequest, SigninResponse, SignupRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod router;
pub mod session;
pub mod token_store;

pub use error::ClientError;
pub use router::{NavigationOutcome, SellView, UnknownView, View, ViewRouter};
pub use session::Session;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

#[derive(Debug, Clone)]
pub enum ClientEvent {
    SessionChanged(Option<UserProfile>),
    ViewChanged(View),
    ListingsUpdated(usize),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub image: Option<ImageUpload>,
}

/// Client core for the marketplace storefront: owns the session lifecycle,
/// the in-memory listing collection, and the view router a UI shell renders
/// from. All network calls are single-attempt; failures are terminal for
/// that user action.
pub struct MarketplaceClient {
    http: Client,
    server_url: String,
    token_store: Arc<dyn TokenStore>,
    inner: Mutex<MarketplaceState>,
    router: Mutex<ViewRouter>,
    events: broadcast::Sender<ClientEvent>,
}

struct MarketplaceState {
    session: Session,
    // Bumped by login/logout. In-flight resolutions capture it before
    // awaiting and discard their result if it moved.
    session_epoch: u64,
    listings: Vec<Listing>,
    // Last-writer-wins guard for overlapping listing refreshes.
    listings_generation: u64,
}

impl MarketplaceClient {
    pub fn new(server_url: impl Into<String>, token_store: Arc<dyn TokenStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            server_url: server_url.into(),
            token_store,
            inner: Mutex::new(MarketplaceState {
                session: Session::default(),
                session_epoch: 0,
                listings: Vec::new(),
                listings_generation: 0,
            }),
            router: Mutex::new(ViewRouter::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.server_url)
    }

    // ---- session lifecycle ----

    pub async fn session(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.lock().await.session.user().cloned()
    }

    /// Startup path: if a token survived the last process, try to resolve it
    /// into a user profile. Returns whether a session was restored. Any
    /// failure (network or rejected credential) discards the persisted token
    /// and leaves the session empty; the cause is logged, never surfaced.
    pub async fn resolve_stored_session(&self) -> bool {
        match self.try_resolve_stored_session().await {
            Ok(restored) => restored,
            Err(err) => {
                warn!("stored session resolution failed, degrading to logged out: {err}");
                false
            }
        }
    }

    async fn try_resolve_stored_session(&self) -> Result<bool, ClientError> {
        let stored = self
            .token_store
            .load()
            .await
            .map_err(|err| ClientError::AuthResolutionFailed(err.to_string()))?;
        let Some(token) = stored else {
            // Nothing persisted: logged out, no network call.
            return Ok(false);
        };

        let epoch = {
            let mut guard = self.inner.lock().await;
            guard.session.set_resolving(token.clone());
            guard.session_epoch
        };

        let user = match self.fetch_current_user(&token).await {
            Ok(user) => user,
            Err(err) => {
                let stale = {
                    let mut guard = self.inner.lock().await;
                    if guard.session_epoch == epoch {
                        guard.session.clear();
                        false
                    } else {
                        true
                    }
                };
                if !stale {
                    if let Err(clear_err) = self.token_store.clear().await {
                        warn!("failed to discard rejected token: {clear_err}");
                    }
                }
                let reason = match &err {
                    ClientError::AuthRejected => "stored token rejected by backend".to_string(),
                    other => other.to_string(),
                };
                return Err(ClientError::AuthResolutionFailed(reason));
            }
        };

        {
            let mut guard = self.inner.lock().await;
            if guard.session_epoch != epoch {
                info!("discarding stale session resolution result");
                return Ok(false);
            }
            guard.session.establish(token, user.clone());
        }

        let _ = self
            .events
            .send(ClientEvent::SessionChanged(Some(user.clone())));
        info!(user_id = user.id.0, "session restored from stored token");
        Ok(true)
    }

    async fn fetch_current_user(&self, token: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .get(self.api_url("/auth/user"))
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN
        {
            return Err(ClientError::AuthRejected);
        }
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Authenticates against the backend; on success the token is persisted
    /// first, then both credential and profile land in memory. Overwrites
    /// any previous session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.api_url("/auth/signin"))
            .json(&SigninRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ApiError>()
                .await
                .map(|err| err.message)
                .unwrap_or_else(|_| status.to_string());
            warn!(%status, %detail, "signin rejected by backend");
            return Err(ClientError::AuthRejected);
        }

        let body: SigninResponse = response.json().await?;

        if let Err(err) = self.token_store.save(&body.token).await {
            // The session still works for this process; only restart
            // persistence is lost.
            warn!("failed to persist bearer token: {err}");
        }

        {
            let mut guard = self.inner.lock().await;
            guard.session_epoch += 1;
            guard.session.establish(body.token, body.user.clone());
        }

        let _ = self
            .events
            .send(ClientEvent::SessionChanged(Some(body.user.clone())));
        info!(user_id = body.user.id.0, "signed in");
        Ok(body.user)
    }

    /// Erases the persisted token and clears the in-memory session. Always
    /// succeeds; storage trouble is logged and reported as an event only.
    pub async fn logout(&self) {
        if let Err(err) = self.token_store.clear().await {
            warn!("failed to clear persisted token on logout: {err}");
            let _ = self
                .events
                .send(ClientEvent::Error(format!("logout cleanup failed: {err}")));
        }

        {
            let mut guard = self.inner.lock().await;
            guard.session_epoch += 1;
            guard.session.clear();
        }

        let _ = self.events.send(ClientEvent::SessionChanged(None));
        info!("signed out");
    }

    /// Registers a new account. Leaves the session untouched; the caller is
    /// expected to route the user to the login view afterwards.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.api_url("/auth/signup"))
            .json(&SignupRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiError>()
                .await
                .map(|err| err.message)
                .unwrap_or_else(|_| format!("signup failed with status {status}"));
            return Err(ClientError::Validation(message));
        }

        Ok(response.json().await?)
    }

    // ---- listings ----

    pub async fn listings(&self) -> Vec<Listing> {
        self.inner.lock().await.listings.clone()
    }

    /// Replaces the in-memory listing collection from the backend. When
    /// refreshes overlap, only the most recently started one may commit its
    /// result.
    pub async fn refresh_listings(&self) -> Result<usize, ClientError> {
        let generation = {
            let mut guard = self.inner.lock().await;
            guard.listings_generation += 1;
            guard.listings_generation
        };

        let listings: Vec<Listing> = self
            .http
            .get(self.api_url("/crops"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let count = {
            let mut guard = self.inner.lock().await;
            if guard.listings_generation != generation {
                info!("discarding stale listing refresh result");
                return Ok(guard.listings.len());
            }
            guard.listings = listings;
            guard.listings.len()
        };

        let _ = self.events.send(ClientEvent::ListingsUpdated(count));
        Ok(count)
    }

    /// Submits a new listing. Requires an active session; refused
    /// client-side otherwise. On success the returned record is appended to
    /// the in-memory collection and the sell page drops back to the listing
    /// browser. No optimistic update, so a failure leaves the collection
    /// unchanged.
    pub async fn create_listing(&self, draft: ListingDraft) -> Result<Listing, ClientError> {
        let token = {
            let guard = self.inner.lock().await;
            guard
                .session
                .token()
                .map(str::to_string)
                .ok_or(ClientError::NotAuthenticated)?
        };

        let mut form = multipart::Form::new()
            .text("name", draft.name)
            .text("price", draft.price.to_string())
            .text("unit", draft.unit);
        if let Some(image) = draft.image {
            let mut part = multipart::Part::bytes(image.bytes).file_name(image.filename);
            if let Some(mime) = image.mime_type {
                part = part.mime_str(&mime)?;
            }
            form = form.part("image", part);
        }

        let response = self
            .http
            .post(self.api_url("/crops"))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiError>()
                .await
                .map(|err| err.message)
                .unwrap_or_else(|_| format!("listing rejected with status {status}"));
            return Err(ClientError::Validation(message));
        }

        let listing: Listing = response.json().await?;

        let count = {
            let mut guard = self.inner.lock().await;
            guard.listings.push(listing.clone());
            guard.listings.len()
        };
        self.router.lock().await.show_listing_list();

        let _ = self.events.send(ClientEvent::ListingsUpdated(count));
        info!(listing_id = listing.id.0, "listing created");
        Ok(listing)
    }

    // ---- view routing ----

    pub async fn current_view(&self) -> View {
        self.router.lock().await.current()
    }

    pub async fn sell_view(&self) -> SellView {
        self.router.lock().await.sell_view()
    }

    pub async fn scroll_generation(&self) -> u64 {
        self.router.lock().await.scroll_generation()
    }

    pub async fn navigate(&self, view: View) {
        self.router.lock().await.navigate(view);
        let _ = self.events.send(ClientEvent::ViewChanged(view));
    }

    pub async fn navigate_named(&self, name: &str) -> NavigationOutcome {
        let outcome = self.router.lock().await.navigate_named(name);
        if let NavigationOutcome::Moved(view) = outcome {
            let _ = self.events.send(ClientEvent::ViewChanged(view));
        }
        outcome
    }

    /// Opens the listing form on the sell page. The control only exists for
    /// signed-in users, so this refuses without a session.
    pub async fn open_listing_form(&self) -> Result<(), ClientError> {
        if !self.inner.lock().await.session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        self.router.lock().await.show_listing_form();
        Ok(())
    }

    pub async fn close_listing_form(&self) {
        self.router.lock().await.show_listing_list();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
