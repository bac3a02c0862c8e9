//! Polygon identifiers.
//!
//! Ids arrive from the annotation backend as strings (`"cell_17"`) and are
//! minted locally when a polygon is drawn or split. Both kinds share one
//! process-wide interner, which lets a freshly minted id check that no
//! loaded polygon already uses its name.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static POLYGON_NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Suffix counter for [`PolygonId::with_prefix`].
static NEXT_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// Identifier of one annotated polygon. Compares and hashes as an integer;
/// serializes as the original string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolygonId(Spur);

impl PolygonId {
    /// The id for a backend polygon name.
    pub fn intern(name: &str) -> Self {
        PolygonId(POLYGON_NAMES.get_or_intern(name))
    }

    pub fn as_str(&self) -> &str {
        POLYGON_NAMES.resolve(&self.0)
    }

    /// Id for a polygon drawn or produced by a slice.
    pub fn fresh() -> Self {
        Self::with_prefix("polygon")
    }

    /// `{prefix}_{n}` for the first `n` whose name no loaded polygon uses.
    pub fn with_prefix(prefix: &str) -> Self {
        loop {
            let n = NEXT_SUFFIX.fetch_add(1, Ordering::Relaxed);
            let name = format!("{prefix}_{n}");
            if POLYGON_NAMES.get(&name).is_none() {
                return Self::intern(&name);
            }
        }
    }
}

impl fmt::Debug for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolygonId({:?})", self.as_str())
    }
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PolygonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PolygonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(PolygonId::intern(&name))
    }
}
