//! Loaded schema documents and the identifiers they declare.
use crate::{
    error::SchemaError,
    paths::{JsonPointer, PathChunk},
    retriever::Retrievers,
    schemas::{self, Draft},
    tree::{strip_empty_fragment, SchemaLocation, SchemaTree},
};
use ahash::AHashMap;
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Maps absolute URIs to loaded documents.
///
/// Documents are either registered up front or fetched on first use through the configured
/// retrievers. Registration is first-writer-wins: once a URI has a document it never changes.
/// Identifiers declared inside documents (`id` / `$id`, including plain-name fragments) are
/// indexed when the document is added, so references can target them directly.
#[derive(Debug)]
pub struct SchemaRegistry {
    draft: Draft,
    retrievers: Retrievers,
    documents: RwLock<AHashMap<Arc<Url>, Arc<Value>>>,
    identifiers: RwLock<AHashMap<Url, SchemaLocation>>,
}

impl SchemaRegistry {
    pub(crate) fn new(draft: Draft, retrievers: Retrievers) -> Self {
        SchemaRegistry {
            draft,
            retrievers,
            documents: RwLock::new(AHashMap::new()),
            identifiers: RwLock::new(AHashMap::new()),
        }
    }

    /// Add a document under `uri` unless one is already present.
    ///
    /// Returns the document stored for `uri`, which is the earlier one if there was a race.
    pub fn register(&self, uri: &Url, document: Value) -> Arc<Value> {
        let uri = Arc::new(strip_fragment(uri));
        let (stored, inserted) = {
            let mut documents = self.documents.write();
            match documents.get(&uri) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let document = Arc::new(document);
                    documents.insert(Arc::clone(&uri), Arc::clone(&document));
                    (document, true)
                }
            }
        };
        if inserted {
            self.index_identifiers(&uri, &stored);
        }
        stored
    }

    /// Whether a document is loaded under `uri`.
    #[must_use]
    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.read().contains_key(&strip_fragment(uri))
    }

    /// Number of loaded documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// The root of the document loaded from `uri`, fetching it if needed.
    pub(crate) fn tree(&self, uri: &Url) -> Result<SchemaTree, SchemaError> {
        let uri = strip_fragment(uri);
        let (uri, document) = self.load(uri)?;
        Ok(SchemaTree::new(self.draft, uri, document))
    }

    /// A tree positioned at the target of an absolute reference.
    ///
    /// The reference may address a declared identifier, a document, or a JSON pointer into
    /// either of those.
    pub(crate) fn locate(&self, reference: &Url) -> Result<SchemaTree, SchemaError> {
        let reference = strip_empty_fragment(reference.clone());
        let declared = self.identifiers.read().get(&reference).cloned();
        if let Some(location) = declared {
            return self.positioned(&location, &JsonPointer::new(), &reference);
        }
        let base = strip_fragment(&reference);
        let fragment = reference
            .fragment()
            .map(|fragment| percent_decode_str(fragment).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        if !fragment.is_empty() && !fragment.starts_with('/') {
            // A plain-name fragment that nothing declared
            return Err(dangling(&reference));
        }
        let relative =
            JsonPointer::parse(&fragment).map_err(|source| SchemaError::InvalidPointer {
                uri: reference.to_string(),
                source,
            })?;
        let location = if self.contains(&base) {
            None
        } else {
            self.identifiers.read().get(&base).cloned()
        };
        let location = match location {
            Some(location) => location,
            None => {
                let (uri, _) = self.load(base)?;
                SchemaLocation::new(uri, JsonPointer::new())
            }
        };
        self.positioned(&location, &relative, &reference)
    }

    fn positioned(
        &self,
        location: &SchemaLocation,
        relative: &JsonPointer,
        reference: &Url,
    ) -> Result<SchemaTree, SchemaError> {
        let (uri, document) = self.load(location.uri().clone())?;
        let pointer = location.pointer().extend(relative);
        if pointer.get(&document).is_none() {
            return Err(dangling(reference));
        }
        Ok(SchemaTree::new(self.draft, uri, document).set_pointer(pointer))
    }

    fn load(&self, uri: Url) -> Result<(Arc<Url>, Arc<Value>), SchemaError> {
        if let Some((key, document)) = self.documents.read().get_key_value(&uri) {
            return Ok((Arc::clone(key), Arc::clone(document)));
        }
        tracing::debug!(uri = %uri, "fetching schema document");
        let document = self.retrievers.retrieve(&uri).map_err(|error| {
            tracing::warn!(uri = %uri, error = %error, "failed to fetch schema document");
            error
        })?;
        let document = self.register(&uri, document);
        Ok((Arc::new(uri), document))
    }

    fn index_identifiers(&self, uri: &Arc<Url>, document: &Value) {
        let mut found = Vec::new();
        collect_identifiers(self.draft, uri, document, &JsonPointer::new(), &mut found);
        if found.is_empty() {
            return;
        }
        let mut identifiers = self.identifiers.write();
        for (identifier, pointer) in found {
            identifiers
                .entry(identifier)
                .or_insert_with(|| SchemaLocation::new(Arc::clone(uri), pointer));
        }
    }
}

fn strip_fragment(uri: &Url) -> Url {
    let mut uri = uri.clone();
    uri.set_fragment(None);
    uri
}

fn dangling(reference: &Url) -> SchemaError {
    SchemaError::DanglingReference {
        reference: reference.to_string(),
    }
}

/// Walk a document and collect every declared identifier with the pointer of its fragment.
fn collect_identifiers(
    draft: Draft,
    base: &Url,
    schema: &Value,
    pointer: &JsonPointer,
    found: &mut Vec<(Url, JsonPointer)>,
) {
    match schema {
        Value::Object(object) => {
            let mut base = base.clone();
            if let Some(id) = schemas::id_of(draft, schema) {
                if let Ok(resolved) = base.join(id) {
                    let resolved = strip_empty_fragment(resolved);
                    found.push((resolved.clone(), pointer.clone()));
                    base = resolved;
                }
            }
            for (key, subschema) in object {
                // Literal values are not schemas
                if key == "enum" || key == "const" {
                    continue;
                }
                let child = pointer.join(PathChunk::Property(key));
                collect_identifiers(draft, &base, subschema, &child, found);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                collect_identifiers(draft, base, item, &pointer.join(idx), found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::SchemaFetchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn url(value: &str) -> Url {
        Url::parse(value).expect("Valid URI")
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(Draft::Draft7, Retrievers::default())
    }

    #[test]
    fn first_writer_wins() {
        let registry = registry();
        let uri = url("http://example.com/a.json");
        registry.register(&uri, json!({"type": "string"}));
        let stored = registry.register(&uri, json!({"type": "integer"}));
        assert_eq!(*stored, json!({"type": "string"}));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn locates_pointer_fragments() {
        let registry = registry();
        let uri = url("http://example.com/a.json");
        registry.register(&uri, json!({"definitions": {"x y": {"type": "null"}}}));
        let tree = registry
            .locate(&url("http://example.com/a.json#/definitions/x%20y"))
            .expect("Located");
        assert_eq!(tree.node(), Some(&json!({"type": "null"})));
        assert_eq!(tree.pointer().to_string(), "/definitions/x y");
    }

    #[test]
    fn locates_embedded_identifiers() {
        let registry = registry();
        let root = url("json-schema:///");
        registry.register(
            &root,
            json!({
                "definitions": {
                    "node": {"$id": "http://example.com/node.json", "type": "object"},
                    "anchor": {"$id": "#leaf", "type": "string"}
                }
            }),
        );
        let node = registry
            .locate(&url("http://example.com/node.json"))
            .expect("Located");
        assert_eq!(node.loading_uri().as_str(), "json-schema:///");
        assert_eq!(node.pointer().to_string(), "/definitions/node");

        let nested = registry
            .locate(&url("http://example.com/node.json#/type"))
            .expect("Located");
        assert_eq!(nested.node(), Some(&json!("object")));

        let anchor = registry
            .locate(&url("json-schema:///#leaf"))
            .expect("Located");
        assert_eq!(anchor.pointer().to_string(), "/definitions/anchor");
    }

    #[test]
    fn missing_targets_dangle() {
        let registry = registry();
        let root = url("json-schema:///");
        registry.register(&root, json!({}));
        assert!(matches!(
            registry.locate(&url("json-schema:///#/definitions/missing")),
            Err(SchemaError::DanglingReference { .. })
        ));
        assert!(matches!(
            registry.locate(&url("json-schema:///#nowhere")),
            Err(SchemaError::DanglingReference { .. })
        ));
    }

    #[test]
    fn invalid_pointer_fragment() {
        let registry = registry();
        let root = url("json-schema:///");
        registry.register(&root, json!({}));
        assert!(matches!(
            registry.locate(&url("json-schema:///#/a~2")),
            Err(SchemaError::InvalidPointer { .. })
        ));
    }

    #[test]
    fn fetches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut retrievers = Retrievers::default();
        retrievers.set_fallback(Arc::new(
            move |_: &Url| -> Result<Value, SchemaFetchError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"definitions": {"a": {"type": "integer"}}}))
            },
        ));
        let registry = SchemaRegistry::new(Draft::Draft7, retrievers);
        for _ in 0..3 {
            registry
                .locate(&url("http://example.com/remote.json#/definitions/a"))
                .expect("Located");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.contains(&url("http://example.com/remote.json")));
    }

    #[test]
    fn unsupported_scheme_for_relative_documents() {
        let registry = registry();
        assert!(matches!(
            registry.locate(&url("json-schema:///other.json")),
            Err(SchemaError::UnsupportedScheme { .. })
        ));
    }
}
