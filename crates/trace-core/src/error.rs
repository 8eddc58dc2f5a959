use thiserror::Error;

use crate::session::NetId;

/// A pin name outside the "letters, one optional number, letters" grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed pin name '{raw}': {reason}")]
pub struct MalformedName {
    pub raw: String,
    pub reason: &'static str,
}

/// Lookup failures for the search helpers and pin selectors.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("no {what} matches '{query}'")]
    NotFound { what: &'static str, query: String },

    #[error("{count} {what}s match '{query}', expected exactly one")]
    Ambiguous {
        what: &'static str,
        query: String,
        count: usize,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl QueryError {
    /// Reduce a match list to its single element.
    pub(crate) fn exactly_one<T: Copy>(
        matches: &[T],
        what: &'static str,
        query: &str,
    ) -> Result<T, QueryError> {
        match matches {
            [one] => Ok(*one),
            [] => Err(QueryError::NotFound {
                what,
                query: query.to_string(),
            }),
            many => Err(QueryError::Ambiguous {
                what,
                query: query.to_string(),
                count: many.len(),
            }),
        }
    }
}

/// Errors raised while building the connectivity graph. Construction never
/// partially completes when one of these is returned.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("reference '{reference}' is already used by another component")]
    DuplicateReference { reference: String },

    #[error("net name '{name}' is already used by another net")]
    DuplicateNetName { name: String },

    #[error("{net} has been destroyed")]
    DestroyedNet { net: NetId },

    #[error("component {component}: {source}")]
    Pin {
        component: String,
        #[source]
        source: QueryError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("library '{name}' not found")]
    LibraryNotFound { name: String },

    #[error("part '{part}' not found in library '{library}'")]
    PartNotFound { library: String, part: String },

    #[error("part '{part}': {source}")]
    MalformedPinName {
        part: String,
        #[source]
        source: MalformedName,
    },
}
