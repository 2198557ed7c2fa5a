//! Recursive projector.
//!
//! Walks an object graph alongside a selection tree and a permission
//! scope. Every field is checked against the scope before it is read;
//! denied fields are skipped without a key, missing attributes abort the
//! projection. Nested collections with a valid `.order(...)` directive
//! are reordered before their elements are projected.

use crate::order::order_sequence;
use crate::projection::Projection;
use indexmap::IndexMap;
use prism_core::{
    DiagnosticKind, Diagnostics, GraphObject, GraphValue, PrismError, PrismResult,
};
use prism_policy::{PermissionTree, Scope};
use prism_select::{OrderDirective, SelectionNode};
use serde::{Deserialize, Serialize};

/// Key wrapping a root collection under [`CollectionWrapping::Data`]
pub const DATA_KEY: &str = "data";

/// How a root collection is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionWrapping {
    /// A bare array
    Bare,
    /// An object with the array under `data`
    #[default]
    Data,
}

/// Projector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Shape of a root collection
    pub wrapping: CollectionWrapping,
    /// Attribute nested collections are ordered by
    pub order_key: String,
    /// Record a diagnostic for every field the allow-list hides
    pub diagnose_denied_fields: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            wrapping: CollectionWrapping::Data,
            order_key: "created_at".to_string(),
            diagnose_denied_fields: true,
        }
    }
}

/// Projects object graphs through selections
#[derive(Debug, Clone, Default)]
pub struct Projector {
    config: ProjectorConfig,
}

impl Projector {
    /// Create a projector with default config
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ProjectorConfig::default(),
        }
    }

    /// Create a projector with custom config
    #[must_use]
    pub fn with_config(config: ProjectorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Project `target` through `nodes` within `scope`.
    ///
    /// A root sequence is wrapped according to the configured
    /// [`CollectionWrapping`]; nested sequences never are.
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::AttributeNotFound`] if a permitted field does
    /// not exist on the object it was requested from.
    pub fn project(
        &self,
        target: &GraphValue<'_>,
        nodes: &[SelectionNode],
        scope: Scope<'_>,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        tracing::debug!(
            target = target.kind_name(),
            fields = nodes.len(),
            restricted = !scope.is_unrestricted(),
            "projecting"
        );

        let projection = self.project_value(target, nodes, scope, "", diagnostics)?;
        match (target, self.config.wrapping) {
            (GraphValue::Sequence(_), CollectionWrapping::Data) => {
                let mut wrapped = IndexMap::new();
                wrapped.insert(DATA_KEY.to_string(), projection);
                Ok(Projection::Object(wrapped))
            }
            _ => Ok(projection),
        }
    }

    /// Parse `selector` and project `target` through it within `permissions`
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::Syntax`] for a malformed selector, otherwise
    /// as [`Projector::project`].
    pub fn project_selector(
        &self,
        target: &GraphValue<'_>,
        selector: &str,
        permissions: &PermissionTree,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        let nodes = prism_select::parse(selector)?;
        self.project(target, &nodes, permissions.scope(), diagnostics)
    }

    fn project_value(
        &self,
        value: &GraphValue<'_>,
        nodes: &[SelectionNode],
        scope: Scope<'_>,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        match value {
            // Nothing to select from.
            GraphValue::Scalar(_) => Ok(Projection::empty_object()),
            GraphValue::Object(object) => {
                self.project_object(object.as_ref(), nodes, scope, path, diagnostics)
            }
            GraphValue::Sequence(sequence) => {
                self.project_elements(&sequence.elements(), nodes, scope, path, diagnostics)
            }
        }
    }

    fn project_elements(
        &self,
        elements: &[GraphValue<'_>],
        nodes: &[SelectionNode],
        scope: Scope<'_>,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let path = format!("{}[{}]", path, i);
                self.project_value(element, nodes, scope, &path, diagnostics)
            })
            .collect::<PrismResult<Vec<_>>>()
            .map(Projection::Array)
    }

    fn project_object(
        &self,
        object: &dyn GraphObject,
        nodes: &[SelectionNode],
        scope: Scope<'_>,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        let mut members = IndexMap::with_capacity(nodes.len());

        for node in nodes {
            let field_path = join(path, &node.name);

            if !scope.permitted(&node.name) {
                if self.config.diagnose_denied_fields {
                    diagnostics.record(
                        DiagnosticKind::FieldNotPermitted,
                        format!("Field {} is not permitted", field_path),
                    );
                }
                continue;
            }

            let raw = object
                .get_attribute(&node.name)
                .ok_or_else(|| PrismError::AttributeNotFound {
                    type_name: object.type_name().to_string(),
                    attribute: node.name.clone(),
                })?;

            let projected = match &node.children {
                None => {
                    if node.order.is_some() {
                        tracing::debug!(
                            path = %field_path,
                            "ignoring order on a field without nested fields"
                        );
                    }
                    leaf(&raw)
                }
                Some(children) => self.project_nested(
                    &raw,
                    children,
                    node.order.as_ref(),
                    scope.scope_for(&node.name),
                    &field_path,
                    diagnostics,
                )?,
            };

            members.insert(node.name.clone(), projected);
        }

        Ok(Projection::Object(members))
    }

    fn project_nested(
        &self,
        raw: &GraphValue<'_>,
        children: &[SelectionNode],
        order: Option<&OrderDirective>,
        scope: Scope<'_>,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> PrismResult<Projection> {
        let Some(order) = order else {
            return self.project_value(raw, children, scope, path, diagnostics);
        };

        let Some(direction) = order.direction() else {
            diagnostics.record(
                DiagnosticKind::InvalidOrderDirection,
                format!("Unknown order {:?} on {}", order.token(), path),
            );
            return self.project_value(raw, children, scope, path, diagnostics);
        };

        match raw {
            GraphValue::Sequence(sequence) => {
                let ordered = order_sequence(
                    sequence.as_ref(),
                    &self.config.order_key,
                    direction,
                    path,
                    diagnostics,
                );
                self.project_elements(&ordered, children, scope, path, diagnostics)
            }
            other => {
                diagnostics.record(
                    DiagnosticKind::UnorderableCollection,
                    format!("Cannot order {}: {} is not a collection", path, other.kind_name()),
                );
                self.project_value(raw, children, scope, path, diagnostics)
            }
        }
    }
}

/// Render a value requested without nested fields.
///
/// Objects show their declared fields (never their associations) and
/// sequences show each element that way.
#[must_use]
pub fn leaf(value: &GraphValue<'_>) -> Projection {
    match value {
        GraphValue::Scalar(scalar) => Projection::Scalar(scalar.clone()),
        GraphValue::Object(object) => {
            let members = object
                .schema()
                .fields
                .into_iter()
                .filter_map(|field| {
                    let value = object.get_attribute(&field)?;
                    let projected = leaf(&value);
                    Some((field, projected))
                })
                .collect();
            Projection::Object(members)
        }
        GraphValue::Sequence(sequence) => {
            Projection::Array(sequence.elements().iter().map(leaf).collect())
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}
