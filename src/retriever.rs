//! Logic for retrieving external schema documents.
use crate::error::SchemaError;
use ahash::AHashMap;
use serde_json::Value;
use std::{fmt, sync::Arc};
use url::Url;

/// An opaque error type returned by retrievers on failures.
pub type SchemaFetchError = anyhow::Error;

/// Fetches schema documents that are not registered up front.
///
/// Only called with absolute URIs without a fragment. All operations are blocking.
///
/// # Example
///
/// ```no_run
/// # use serde_json::{json, Value};
/// # use schemata::{Retrieve, SchemaFetchError};
/// # use url::Url;
/// struct InMemory;
///
/// impl Retrieve for InMemory {
///     fn retrieve(&self, uri: &Url) -> Result<Value, SchemaFetchError> {
///         match uri.as_str() {
///             "http://example.com/person.json" => Ok(json!({"type": "object"})),
///             _ => Err(anyhow::anyhow!("'{uri}' is not available")),
///         }
///     }
/// }
/// ```
pub trait Retrieve: Send + Sync {
    /// Fetch and parse the document at `uri`.
    fn retrieve(&self, uri: &Url) -> Result<Value, SchemaFetchError>;
}

impl<F> Retrieve for F
where
    F: Fn(&Url) -> Result<Value, SchemaFetchError> + Send + Sync,
{
    fn retrieve(&self, uri: &Url) -> Result<Value, SchemaFetchError> {
        self(uri)
    }
}

/// Raised by [`DefaultRetriever`] for schemes it has no way to fetch.
#[derive(Debug, thiserror::Error)]
#[error("no retriever for scheme '{scheme}'")]
pub(crate) struct UnsupportedScheme {
    scheme: String,
}

/// Fetches `http(s)` and `file` URIs, depending on enabled features.
pub(crate) struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, uri: &Url) -> Result<Value, SchemaFetchError> {
        match uri.scheme() {
            "http" | "https" => {
                #[cfg(feature = "resolve-http")]
                {
                    let response = reqwest::blocking::get(uri.as_str())?.error_for_status()?;
                    Ok(response.json()?)
                }
                #[cfg(not(feature = "resolve-http"))]
                Err(anyhow::anyhow!(
                    "`resolve-http` feature or a custom retriever is required to fetch schemas via HTTP"
                ))
            }
            "file" => {
                #[cfg(feature = "resolve-file")]
                {
                    let path = uri
                        .to_file_path()
                        .map_err(|()| anyhow::anyhow!("invalid file path"))?;
                    let file = std::fs::File::open(path)?;
                    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
                }
                #[cfg(not(feature = "resolve-file"))]
                Err(anyhow::anyhow!(
                    "`resolve-file` feature or a custom retriever is required to fetch schemas from files"
                ))
            }
            scheme => Err(UnsupportedScheme {
                scheme: scheme.to_string(),
            }
            .into()),
        }
    }
}

/// Retrievers by URI scheme, with a fallback for everything else.
#[derive(Clone)]
pub(crate) struct Retrievers {
    fallback: Arc<dyn Retrieve>,
    by_scheme: AHashMap<String, Arc<dyn Retrieve>>,
}

impl Default for Retrievers {
    fn default() -> Self {
        Retrievers {
            fallback: Arc::new(DefaultRetriever),
            by_scheme: AHashMap::new(),
        }
    }
}

impl fmt::Debug for Retrievers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrievers")
            .field("schemes", &self.by_scheme.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Retrievers {
    pub(crate) fn set_fallback(&mut self, retriever: Arc<dyn Retrieve>) {
        self.fallback = retriever;
    }

    pub(crate) fn insert(&mut self, scheme: String, retriever: Arc<dyn Retrieve>) {
        self.by_scheme.insert(scheme.to_ascii_lowercase(), retriever);
    }

    pub(crate) fn retrieve(&self, uri: &Url) -> Result<Value, SchemaError> {
        let retriever = self
            .by_scheme
            .get(uri.scheme())
            .unwrap_or(&self.fallback);
        retriever.retrieve(uri).map_err(|error| {
            if let Some(unsupported) = error.downcast_ref::<UnsupportedScheme>() {
                SchemaError::UnsupportedScheme {
                    scheme: unsupported.scheme.clone(),
                    uri: uri.to_string(),
                }
            } else {
                SchemaError::Unretrievable {
                    uri: uri.to_string(),
                    source: error,
                }
            }
        })
    }
}
