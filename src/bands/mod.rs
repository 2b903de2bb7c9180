// Nested severity bands and the band classifier
//
// A band set describes, for one operating mode, a `normal` interval wrapped by
// strictly wider `low`, `medium` and `high` intervals. A value's severity is
// the innermost tier containing it; anything past the `high` bounds is still
// `high`.
//
// Band sets are loaded from TOML, validated once per configuration, and then
// classified against per sample without further checks.

mod classifier;
mod definition;

pub use classifier::BandClassifier;
pub use definition::{BandSet, Bands, Bounds};
