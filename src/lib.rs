//! Deterministic layout, picking, and filter engine behind an archival cinema
//! constellation view. Turns a filtered record set into a reproducible,
//! non-overlapping 2D point cloud, resolves ambiguous taps to a single record,
//! and maintains cascading categorical and year-interval filters over the
//! collection. Rendering, fetching, and routing live with the caller.

pub mod engine;
pub mod layout;
pub mod picking;
pub mod records;
pub mod richness;
pub mod util;

pub use engine::{ALL, ConstellationEngine, FilterState, YEAR_FIELD, apply_filters, year_extent};
pub use layout::{LayoutParams, LayoutPoint, layout, spread_radius};
pub use picking::{Hit, PICK_TOLERANCE, resolve, resolve_with_tolerance};
pub use records::{NormalizedRecord, Record, RecordCache, normalize, parse_records};
pub use richness::{RichnessRange, score};
