//! Volume usage reporting
//!
//! Free/used/total space per volume behind a narrow trait, so callers and
//! tests never depend on how the numbers are obtained.

mod reporter;

pub use reporter::{DfReporter, UsageReporter, VolumeUsage, parse_df_output};
