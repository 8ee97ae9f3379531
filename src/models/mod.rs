// Domain models for zone detection
// These modules contain pure business logic independent of the CLI surface

pub mod record;
pub mod timeseries;
pub mod zone;

// Re-export key types for convenience
pub use record::flat_record;
pub use timeseries::{CandleSeries, IndicatorColumns};
pub use zone::{AnnotatedZone, Touch, Zone, ZoneKind, ZonePayload};
