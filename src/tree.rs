//! A positioned, scope-aware view into a loaded schema document.
use crate::{
    paths::{self, JsonPointer, PathChunk},
    schemas::{self, Draft},
};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use std::{fmt, sync::Arc};
use url::Url;

/// The canonical address of a schema fragment: the URI its document was loaded from plus a
/// JSON pointer into that document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaLocation {
    uri: Arc<Url>,
    pointer: JsonPointer,
}

impl SchemaLocation {
    pub(crate) fn new(uri: Arc<Url>, pointer: JsonPointer) -> Self {
        SchemaLocation { uri, pointer }
    }

    /// The URI the containing document was loaded from.
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    #[must_use]
    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.uri, self.pointer)
    }
}

impl Serialize for SchemaLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("loadingURI", self.uri.as_str())?;
        map.serialize_entry("pointer", &self.pointer)?;
        map.end()
    }
}

/// A schema document together with a current position and the stack of resolution scopes
/// declared by `id` / `$id` on the way from the root to that position.
///
/// Trees are immutable; moving the position produces a new tree.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    draft: Draft,
    loading_uri: Arc<Url>,
    document: Arc<Value>,
    pointer: JsonPointer,
    scopes: Vec<Url>,
}

impl SchemaTree {
    pub(crate) fn new(draft: Draft, loading_uri: Arc<Url>, document: Arc<Value>) -> Self {
        let scopes = compute_scopes(draft, &loading_uri, &document, &JsonPointer::new());
        SchemaTree {
            draft,
            loading_uri,
            document,
            pointer: JsonPointer::new(),
            scopes,
        }
    }

    /// The fragment at the current position.
    ///
    /// `None` only when the tree was moved to a pointer the document does not contain.
    #[must_use]
    pub fn node(&self) -> Option<&Value> {
        self.pointer.get(&self.document)
    }

    /// A tree positioned at `relative`, interpreted from the current position.
    #[must_use]
    pub fn append(&self, relative: &JsonPointer) -> SchemaTree {
        let mut scopes = self.scopes.clone();
        if let Some(mut node) = self.node() {
            let mut base = self.context().clone();
            for token in relative.tokens() {
                let Some(next) = paths::step(node, token) else {
                    break;
                };
                node = next;
                if let Some(scope) = declared_scope(self.draft, &base, node) {
                    base = scope.clone();
                    scopes.push(scope);
                }
            }
        }
        SchemaTree {
            draft: self.draft,
            loading_uri: Arc::clone(&self.loading_uri),
            document: Arc::clone(&self.document),
            pointer: self.pointer.extend(relative),
            scopes,
        }
    }

    /// A tree positioned one step below the current position.
    #[must_use]
    pub fn join<'a>(&self, chunk: impl Into<PathChunk<'a>>) -> SchemaTree {
        self.append(&JsonPointer::new().join(chunk))
    }

    /// A tree positioned at an absolute pointer within the same document.
    #[must_use]
    pub fn set_pointer(&self, pointer: JsonPointer) -> SchemaTree {
        let scopes = compute_scopes(self.draft, &self.loading_uri, &self.document, &pointer);
        SchemaTree {
            draft: self.draft,
            loading_uri: Arc::clone(&self.loading_uri),
            document: Arc::clone(&self.document),
            pointer,
            scopes,
        }
    }

    /// The resolution scope in effect at the current position: the innermost declared scope,
    /// or the loading URI when no fragment on the way declares one.
    #[must_use]
    pub fn context(&self) -> &Url {
        self.scopes.last().unwrap_or(self.loading_uri.as_ref())
    }

    /// Declared scopes, outermost first.
    #[must_use]
    pub fn scopes(&self) -> &[Url] {
        &self.scopes
    }

    #[must_use]
    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }

    #[must_use]
    pub fn loading_uri(&self) -> &Url {
        &self.loading_uri
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// The `$schema` declared at the document root, if it is an absolute URI.
    #[must_use]
    pub fn meta_schema(&self) -> Option<Url> {
        schemas::meta_schema_of(&self.document)
    }

    /// Canonical address of the current position.
    #[must_use]
    pub fn location(&self) -> SchemaLocation {
        SchemaLocation::new(Arc::clone(&self.loading_uri), self.pointer.clone())
    }
}

/// A scope URI with an empty fragment is the same resource as the one without it.
pub(crate) fn strip_empty_fragment(mut uri: Url) -> Url {
    if uri.fragment() == Some("") {
        uri.set_fragment(None);
    }
    uri
}

fn declared_scope(draft: Draft, base: &Url, node: &Value) -> Option<Url> {
    let id = schemas::id_of(draft, node)?;
    base.join(id).ok().map(strip_empty_fragment)
}

fn compute_scopes(
    draft: Draft,
    loading_uri: &Url,
    document: &Value,
    pointer: &JsonPointer,
) -> Vec<Url> {
    let mut scopes = Vec::new();
    let mut base = loading_uri.clone();
    let mut node = document;
    if let Some(scope) = declared_scope(draft, &base, node) {
        base = scope.clone();
        scopes.push(scope);
    }
    for token in pointer.tokens() {
        let Some(next) = paths::step(node, token) else {
            break;
        };
        node = next;
        if let Some(scope) = declared_scope(draft, &base, node) {
            base = scope.clone();
            scopes.push(scope);
        }
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(document: Value) -> SchemaTree {
        let uri = Url::parse("http://example.com/root.json").expect("Valid URI");
        SchemaTree::new(Draft::Draft7, Arc::new(uri), Arc::new(document))
    }

    fn pointer(value: &str) -> JsonPointer {
        JsonPointer::parse(value).expect("Valid pointer")
    }

    #[test]
    fn root_context_is_loading_uri() {
        let tree = tree(json!({"type": "string"}));
        assert_eq!(tree.context().as_str(), "http://example.com/root.json");
        assert!(tree.scopes().is_empty());
        assert_eq!(tree.node(), Some(&json!({"type": "string"})));
    }

    #[test]
    fn nested_ids_resolve_against_enclosing_scope() {
        let tree = tree(json!({
            "$id": "http://x.com/a/",
            "properties": {
                "b": {"$id": "b/", "items": {"$id": "c.json"}}
            }
        }));
        let positioned = tree.append(&pointer("/properties/b/items"));
        assert_eq!(
            positioned
                .scopes()
                .iter()
                .map(Url::as_str)
                .collect::<Vec<_>>(),
            vec!["http://x.com/a/", "http://x.com/a/b/", "http://x.com/a/b/c.json"]
        );
        assert_eq!(positioned.context().as_str(), "http://x.com/a/b/c.json");
    }

    #[test]
    fn append_and_set_pointer_agree() {
        let tree = tree(json!({
            "$id": "http://x.com/",
            "definitions": {"a": {"$id": "a.json", "type": "integer"}}
        }));
        let appended = tree.join("definitions").join("a");
        let moved = tree.set_pointer(pointer("/definitions/a"));
        assert_eq!(appended.scopes(), moved.scopes());
        assert_eq!(appended.location(), moved.location());
        assert_eq!(moved.node(), Some(&json!({"$id": "a.json", "type": "integer"})));
    }

    #[test]
    fn non_string_ids_are_ignored() {
        let tree = tree(json!({"properties": {"$id": {"$id": 5}}}));
        let positioned = tree.append(&pointer("/properties/$id"));
        assert!(positioned.scopes().is_empty());
    }

    #[test]
    fn empty_fragment_is_dropped_from_scope() {
        let tree = tree(json!({"$id": "http://x.com/root.json#"}));
        assert_eq!(tree.context().as_str(), "http://x.com/root.json");
    }

    #[test]
    fn set_pointer_upwards_drops_scopes() {
        let tree = tree(json!({"definitions": {"a": {"$id": "http://x.com/a"}}}));
        let inner = tree.set_pointer(pointer("/definitions/a"));
        assert_eq!(inner.scopes().len(), 1);
        let outer = inner.set_pointer(JsonPointer::new());
        assert!(outer.scopes().is_empty());
        assert_eq!(outer.context().as_str(), "http://example.com/root.json");
    }

    #[test]
    fn meta_schema_must_be_absolute() {
        assert_eq!(
            tree(json!({"$schema": "http://json-schema.org/draft-04/schema#"}))
                .meta_schema()
                .map(|uri| uri.to_string()),
            Some("http://json-schema.org/draft-04/schema#".to_string())
        );
        assert!(tree(json!({"$schema": "schema.json"})).meta_schema().is_none());
    }

    #[test]
    fn missing_target_has_no_node() {
        let tree = tree(json!({}));
        assert!(tree.set_pointer(pointer("/definitions/nope")).node().is_none());
    }
}
