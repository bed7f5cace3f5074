pub mod alignment;
pub mod compare;
pub mod errors;
pub mod normalize;
pub mod scoring;

pub use alignment::{AlignOp, Aligner, Alignment};
pub use compare::{ComparisonResult, Segment, SegmentKind};
pub use scoring::ScoreSnapshot;
