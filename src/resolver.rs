//! Following `$ref` chains to the fragment that actually constrains an instance.
use crate::{error::SchemaError, registry::SchemaRegistry, tree::strip_empty_fragment, SchemaTree};
use serde_json::Value;

/// Resolves references against the registry.
///
/// Every call tracks its own resolution path, so concurrent resolutions never see each other's
/// state.
pub(crate) struct ReferenceResolver<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> ReferenceResolver<'r> {
    pub(crate) fn new(registry: &'r SchemaRegistry) -> Self {
        ReferenceResolver { registry }
    }

    /// Follow `$ref` until the tree points at a fragment without one.
    ///
    /// Fragments without a string `$ref` are returned unchanged. A non-string `$ref` is left to
    /// the syntax check.
    pub(crate) fn resolve(&self, tree: SchemaTree) -> Result<SchemaTree, SchemaError> {
        let mut path = vec![tree.location()];
        let mut tree = tree;
        while let Some(reference) = reference_of(tree.node()) {
            let target = tree
                .context()
                .join(reference)
                .map(strip_empty_fragment)
                .map_err(|source| SchemaError::InvalidReference {
                    reference: reference.to_string(),
                    source,
                })?;
            let next = self.registry.locate(&target)?;
            let location = next.location();
            if path.contains(&location) {
                let mut path: Vec<String> = path.iter().map(ToString::to_string).collect();
                path.push(location.to_string());
                return Err(SchemaError::ReferenceLoop { path });
            }
            tracing::trace!(reference = %target, location = %location, "followed reference");
            path.push(location);
            tree = next;
        }
        Ok(tree)
    }
}

fn reference_of(node: Option<&Value>) -> Option<&str> {
    node?.as_object()?.get("$ref")?.as_str()
}
