// src/fetch/metadata.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{FetchError, Result};

/// Identifier of a dataset as the API names it. Opaque; the API does the validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

/// Identifier of one immutable snapshot of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(DatasetId);
string_id!(SnapshotId);

/// The `current_snapshot` object embedded in dataset metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SnapshotId>,
    /// Everything else the API reports about the snapshot.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Dataset metadata as returned by `GET datasets/{id}`.
///
/// The JSON object is kept verbatim, nulls included, so callers can read it as
/// a mapping; the keys the fetcher relies on are also decoded into typed
/// fields. Deserialising anything other than a JSON object fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DatasetMetadata {
    id: Option<DatasetId>,
    display_name: Option<String>,
    current_snapshot: Option<SnapshotRef>,
    raw: Map<String, Value>,
}

#[derive(Deserialize)]
struct TypedKeys {
    #[serde(default)]
    id: Option<DatasetId>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    current_snapshot: Option<SnapshotRef>,
}

impl TryFrom<Map<String, Value>> for DatasetMetadata {
    type Error = serde_json::Error;

    fn try_from(raw: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let typed: TypedKeys = serde_json::from_value(Value::Object(raw.clone()))?;
        Ok(Self {
            id: typed.id,
            display_name: typed.display_name,
            current_snapshot: typed.current_snapshot,
            raw,
        })
    }
}

impl From<DatasetMetadata> for Map<String, Value> {
    fn from(meta: DatasetMetadata) -> Self {
        meta.raw
    }
}

impl DatasetMetadata {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn id(&self) -> Option<&DatasetId> {
        self.id.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn current_snapshot(&self) -> Option<&SnapshotRef> {
        self.current_snapshot.as_ref()
    }

    /// Any top-level key exactly as the API sent it. `Some(Value::Null)` for
    /// an explicit null, `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// The whole document as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.raw.clone()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.raw
    }

    /// `current_snapshot.id`, or [`FetchError::MissingField`] naming `dataset_id`.
    pub fn current_snapshot_id(&self, dataset_id: &str) -> Result<SnapshotId> {
        let snapshot = self
            .current_snapshot
            .as_ref()
            .ok_or_else(|| FetchError::MissingField {
                dataset_id: dataset_id.to_string(),
                field: "current_snapshot",
            })?;

        match &snapshot.id {
            Some(id) if !id.as_str().trim().is_empty() => Ok(id.clone()),
            _ => Err(FetchError::MissingField {
                dataset_id: dataset_id.to_string(),
                field: "current_snapshot.id",
            }),
        }
    }
}
