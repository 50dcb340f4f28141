//! Identifier generation for mnemos
//!
//! Records and investigations use ULIDs rendered in canonical uppercase
//! Crockford base32, so lexical order equals creation order. Summary records
//! produced by compaction reuse the first replaced id with a `-s<count>`
//! suffix, which still sorts between the summary's neighbours.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{MnemosError, Result};

/// Length of a canonical ULID string
const ULID_LEN: usize = 26;

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident, $context:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh time-ordered id
            pub fn generate() -> Self {
                $name(Ulid::new().to_string())
            }

            /// Parse an id supplied by a caller
            pub fn parse(raw: &str) -> Result<Self> {
                let raw = raw.trim();
                let valid = raw
                    .get(..ULID_LEN)
                    .is_some_and(|prefix| Ulid::from_string(prefix).is_ok());
                if !valid {
                    return Err(MnemosError::validation(
                        $context,
                        format!("'{raw}' is not a valid id"),
                    ));
                }
                Ok($name(raw.to_string()))
            }

            /// Get the ID string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

ulid_id!(
    /// Opaque, write-ordered identifier of a record
    RecordId,
    "record id"
);

ulid_id!(
    /// Identifier of an investigation
    InvestigationId,
    "investigation id"
);

impl RecordId {
    /// Id for a summary record replacing `count` records starting at `first`
    pub fn summary_of(first: &RecordId, count: usize) -> Self {
        RecordId(format!("{}-s{}", first.0, count))
    }

    fn ulid(&self) -> Option<Ulid> {
        self.0.get(..ULID_LEN).and_then(|s| Ulid::from_string(s).ok())
    }

    /// Return an id that sorts strictly after `last`, keeping `self` when it
    /// already does.
    pub fn ordered_after(self, last: Option<&RecordId>) -> Result<Self> {
        let Some(last) = last else {
            return Ok(self);
        };
        if self > *last {
            return Ok(self);
        }
        let base = last
            .ulid()
            .ok_or_else(|| MnemosError::invariant(format!("log tail has malformed id {last}")))?;
        base.increment()
            .map(|next| RecordId(next.to_string()))
            .ok_or_else(|| MnemosError::invariant("record id space exhausted"))
    }
}
