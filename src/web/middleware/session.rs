//! Cookie-backed session middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header::COOKIE, header::SET_COOKIE},
    middleware::Next,
    response::Response,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, warn};

use crate::domain::SessionModel;
use crate::state::AppState;

/// Name of the session id cookie.
pub const SESSION_COOKIE: &str = "sid";

/// The request's session, shared between the middleware and the handler.
///
/// Handlers take a copy of the model, work on it, and put it back with
/// [`SessionHandle::replace`]; the middleware persists whatever was put back.
#[derive(Clone, Default)]
pub struct SessionHandle {
    model: Arc<Mutex<SessionModel>>,
}

impl SessionHandle {
    pub fn new(model: SessionModel) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }

    pub fn snapshot(&self) -> SessionModel {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, model: SessionModel) {
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = model;
    }
}

/// Loads the session named by the `sid` cookie and saves it after the handler
/// if it changed.
///
/// # Flow
///
/// 1. Extract `sid` from the `Cookie` header and load it from the store
/// 2. Unknown, expired or missing sessions start empty under a fresh id
/// 3. Run the handler with a [`SessionHandle`] extension
/// 4. If the model is dirty, save it; new sessions also get a `Set-Cookie`
///
/// Store failures are logged and never fail the request.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookie_id = session_id(req.headers());

    let loaded = match &cookie_id {
        Some(id) => st.sessions.load(id).await.unwrap_or_else(|e| {
            warn!("Failed to load session: {}", e);
            None
        }),
        None => None,
    };

    let (session_id, is_new) = match (cookie_id, loaded.is_some()) {
        (Some(id), true) => (id, false),
        _ => (new_session_id(), true),
    };

    let handle = SessionHandle::new(SessionModel::from_values(loaded.unwrap_or_default()));
    req.extensions_mut().insert(handle.clone());

    let mut response = next.run(req).await;

    let model = handle.snapshot();
    if !model.is_dirty() {
        return response;
    }

    if let Err(e) = st.sessions.save(&session_id, model.values()).await {
        error!("Failed to save session: {}", e);
        return response;
    }
    debug!("Session saved");

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session_id
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {}", e),
        }
    }

    response
}

/// Reads the `sid` cookie, ignoring other cookies.
fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(SESSION_COOKIE), Some(value)) if !value.is_empty() => {
                    Some(value.to_string())
                }
                _ => None,
            }
        })
}

fn new_session_id() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
