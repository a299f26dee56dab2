//! Domain layer: value objects and request context.
//!
//! Nothing in here performs I/O. The types are shared by the behaviour
//! pipeline in [`crate::application`] and the HTTP layers.
//!
//! - [`url_value`] - URL normalization and query parameter access
//! - [`return_path`] - The encoded `{baseUrl, path, url}` return-path token
//! - [`form`] - Per-request addressing fields, form values and options
//! - [`session`] - Request-scoped session model

pub mod form;
pub mod return_path;
pub mod session;
pub mod url_value;

pub use form::{FormOptions, FormRequest, FormState, Locals};
pub use return_path::{
    MalformedTokenError, RETURN_PATH_PARAM, RETURN_PATH_SESSION_KEY, ReturnPathToken,
    ReturnPathTransport,
};
pub use session::SessionModel;
pub use url_value::{InvalidUrlError, UrlValue};
