//! Catalog identifiers.
//!
//! Each entity kind gets its own newtype so a stop id can never be passed
//! where a path id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Identifies a bus company.
    CompanyId,
    "CompanyId"
);

catalog_id!(
    /// Identifies a route (a named bus line).
    RouteId,
    "RouteId"
);

catalog_id!(
    /// Identifies one direction of travel of a route.
    PathId,
    "PathId"
);

catalog_id!(
    /// Identifies a stop.
    StopId,
    "StopId"
);
