//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries.
///
/// Values are JSON; each backend converts them to its native wire type.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result, keyed by the RETURN column alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Gets a column, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or deserialization fails.
    ///
    /// ```ignore
    /// let id: String = row.get("id")?;
    /// let linked: i64 = row.get("linked")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        let value = self
            .data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))?;
        decode(key, value)
    }

    /// Gets a column, returning `None` if it is missing or null.
    ///
    /// Still returns an error if the value exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            None => Ok(None),
            Some(v) if v.is_null() => Ok(None),
            Some(v) => decode(key, v).map(Some),
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &JsonValue) -> Result<T, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e)))
}
