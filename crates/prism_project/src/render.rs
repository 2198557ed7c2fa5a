//! Request-level rendering.
//!
//! Reads the `fields`, `metadata` and `debug` parameters of a request,
//! projects the target when fields were asked for, and decorates the
//! response body with metadata and the diagnostics the client asked to
//! see. Without a `fields` parameter the caller's own body is used.

use crate::metadata::{METADATA_KEY, describe};
use crate::projector::Projector;
use prism_core::{DebugLevel, DiagnosticKind, Diagnostics, GraphValue, PrismResult};
use prism_policy::PermissionTree;
use serde_json::Value;

/// Key diagnostics are attached under
pub const DEBUG_KEY: &str = "debug";

/// Query parameters that drive rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Selector from the `fields` parameter
    pub fields: Option<String>,
    /// Whether the `metadata` flag was set
    pub metadata: bool,
    /// Diagnostics to surface, from the `debug` parameter
    pub debug: DebugLevel,
}

impl RenderRequest {
    /// Create a request with no parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector
    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Set the metadata flag
    #[must_use]
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the debug level
    #[must_use]
    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }

    /// Build a request from query pairs. Unknown keys are ignored; the
    /// last occurrence of a key wins.
    #[must_use]
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "fields" => request.fields = Some(value.to_string()),
                "metadata" => request.metadata = is_truthy(value),
                "debug" => request.debug = DebugLevel::from_param(Some(value)),
                _ => {}
            }
        }
        request
    }

    /// Selector to project with, if one was given and is not blank
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.fields
            .as_deref()
            .map(str::trim)
            .filter(|fields| !fields.is_empty())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// A response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON document
    Json(Value),
    /// Anything else, as rendered by the caller
    Raw {
        /// MIME type of the content
        content_type: String,
        /// Encoded content
        bytes: Vec<u8>,
    },
}

impl Body {
    /// Wrap a raw body
    #[must_use]
    pub fn raw(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Raw {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// The body as JSON, if it is JSON
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw { .. } => None,
        }
    }

    /// Read the body as JSON.
    ///
    /// A raw body declared as JSON is decoded; if that fails, or the
    /// content type is anything else, the body is handed back unchanged.
    pub fn into_json(self) -> Result<Value, Self> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Raw {
                content_type,
                bytes,
            } => {
                if is_json_type(&content_type) {
                    if let Ok(value) = serde_json::from_slice(&bytes) {
                        return Ok(value);
                    }
                }
                Err(Self::Raw {
                    content_type,
                    bytes,
                })
            }
        }
    }

    /// Encode the body
    ///
    /// # Errors
    ///
    /// Returns [`prism_core::PrismError::InvalidEncoding`] if the JSON
    /// cannot be encoded.
    pub fn to_bytes(&self) -> PrismResult<Vec<u8>> {
        match self {
            Self::Json(value) => Ok(serde_json::to_vec(value)?),
            Self::Raw { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

fn is_json_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Outcome of rendering one request
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Final body, `None` when there was nothing to render
    pub body: Option<Body>,
    /// Every diagnostic recorded, whatever the debug level
    pub diagnostics: Diagnostics,
}

/// Renders responses for one endpoint
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    projector: Projector,
    permissions: PermissionTree,
}

impl Renderer {
    /// Create a renderer for an endpoint with the given allow-list
    #[must_use]
    pub fn new(permissions: PermissionTree) -> Self {
        Self {
            projector: Projector::new(),
            permissions,
        }
    }

    /// Use a custom projector
    #[must_use]
    pub fn with_projector(mut self, projector: Projector) -> Self {
        self.projector = projector;
        self
    }

    /// Get the projector
    #[must_use]
    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Get the allow-list
    #[must_use]
    pub fn permissions(&self) -> &PermissionTree {
        &self.permissions
    }

    /// Render `target` for `request`.
    ///
    /// `default_body` is what the caller would render without field
    /// selection; it is used when the request has no selector.
    ///
    /// # Errors
    ///
    /// Returns [`prism_core::PrismError::Syntax`] for a malformed selector
    /// and [`prism_core::PrismError::AttributeNotFound`] when a permitted
    /// field does not exist on the target.
    pub fn render(
        &self,
        target: &GraphValue<'_>,
        request: &RenderRequest,
        default_body: Option<Body>,
    ) -> PrismResult<Rendered> {
        let mut diagnostics = Diagnostics::new();

        let mut body = match request.selector() {
            Some(selector) => {
                let projection = self.projector.project_selector(
                    target,
                    selector,
                    &self.permissions,
                    &mut diagnostics,
                )?;
                Some(Body::Json(projection.to_json()))
            }
            None => default_body,
        };

        if request.metadata {
            let metadata = describe(target, self.permissions.scope()).to_json();
            body = merge_metadata(body, metadata, &mut diagnostics);
        }

        if request.debug != DebugLevel::None {
            body = attach_debug(body, &diagnostics, request.debug);
        }

        Ok(Rendered { body, diagnostics })
    }
}

fn merge_metadata(
    body: Option<Body>,
    metadata: Value,
    diagnostics: &mut Diagnostics,
) -> Option<Body> {
    let Some(body) = body else {
        return Some(Body::Json(keyed(METADATA_KEY, metadata)));
    };

    match body.into_json() {
        Ok(Value::Object(mut members)) => {
            members.insert(METADATA_KEY.to_string(), metadata);
            Some(Body::Json(Value::Object(members)))
        }
        Ok(other) => {
            diagnostics.record(
                DiagnosticKind::MetadataForNonObjectBody,
                "Metadata was requested but the response body is not a JSON object",
            );
            Some(Body::Json(other))
        }
        Err(raw) => {
            diagnostics.record(
                DiagnosticKind::MetadataForNonJsonBody,
                "Metadata was requested but the response body is not JSON",
            );
            Some(raw)
        }
    }
}

fn attach_debug(body: Option<Body>, diagnostics: &Diagnostics, level: DebugLevel) -> Option<Body> {
    let entries = diagnostics
        .filtered(level)
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>();
    let entries = match entries {
        Ok(entries) => Value::Array(entries),
        Err(err) => {
            tracing::warn!(error = %err, "could not encode diagnostics");
            return body;
        }
    };

    let Some(body) = body else {
        return Some(Body::Json(keyed(DEBUG_KEY, entries)));
    };

    match body.into_json() {
        Ok(Value::Object(mut members)) => {
            members.insert(DEBUG_KEY.to_string(), entries);
            Some(Body::Json(Value::Object(members)))
        }
        Ok(other) => {
            tracing::debug!("not attaching diagnostics to a non-object body");
            Some(Body::Json(other))
        }
        Err(raw) => {
            tracing::debug!("not attaching diagnostics to a non-JSON body");
            Some(raw)
        }
    }
}

fn keyed(key: &str, value: Value) -> Value {
    let mut members = serde_json::Map::new();
    members.insert(key.to_string(), value);
    Value::Object(members)
}
