pub mod document_ctx;
pub mod segment_flow;

pub use document_ctx::DocumentCtx;
pub use segment_flow::{ProcessResult, SegmentFlow, SegmentedDocument};
