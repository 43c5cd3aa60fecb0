//! Host framework integration.
//!
//! A host web framework exposes its per-request object through
//! [`RequestContext`] and receives a shared engine handle through
//! [`HostApp`]. [`Response`] is a ready-made context for hosts without one.
use minijinja::Value;
use std::sync::Arc;

use crate::engine::ViewEngine;

/// Shared handle to a view engine, as installed into a host application.
pub type Views = Arc<ViewEngine>;

/// Per-request object a render can read ambient state from and write its
/// output into.
pub trait RequestContext {
    /// Request-scoped locals, merged above the default locals and below the
    /// locals of the render call. Anything but a map is ignored.
    fn state(&self) -> Value {
        Value::UNDEFINED
    }

    /// Stores the rendered output as the response body.
    fn set_body(&mut self, body: String);

    /// Marks the response content type.
    fn set_content_type(&mut self, content_type: &str);
}

/// A host application able to hold a view engine for its request handlers.
pub trait HostApp {
    fn install_views(&mut self, views: Views);
}

/// Minimal response object implementing [`RequestContext`].
#[derive(Debug, Default, Clone)]
pub struct Response {
    pub state: Value,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response carrying request-scoped locals.
    pub fn with_state(state: Value) -> Self {
        Self { state, ..Self::default() }
    }
}

impl RequestContext for Response {
    fn state(&self) -> Value {
        self.state.clone()
    }

    fn set_body(&mut self, body: String) {
        self.body = Some(body);
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }
}
