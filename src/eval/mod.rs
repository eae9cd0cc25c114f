//! Schedule encoding and objective extraction.

pub mod codec;
pub mod objectives;
pub mod table;
pub mod tariff;
pub mod types;

pub use codec::{
    CodecConfig, Encoding, ScheduleCodec, SetpointBounds, expand_to_timesteps, repair_rate_limit,
};
pub use objectives::{ObjectiveExtractor, ObjectiveReport};
pub use table::{OutputTable, Window};
pub use tariff::Tariff;
pub use types::{ColumnMap, EvaluationWindows, ExtractorConfig, ZoneColumns};
