pub mod enrichment;
pub mod identity_parser;
pub mod page_classifier;
pub mod record_assembler;
pub mod reply_parser;
pub mod segmentation;
pub mod warn_writer;

pub use enrichment::{apply_replies, EnrichmentSummary};
pub use page_classifier::{
    BareNumberPolicy, BoundaryRule, ClassificationVerdict, ClassifierConfig, PageClassifier,
};
pub use record_assembler::{AssemblyReport, RecordAssembler, UnassignedDiagnostic};
pub use reply_parser::parse_reply;
pub use segmentation::{ImageNamer, PageAssignment, SegmentationOutcome, SegmentationState, Segmenter};
pub use warn_writer::WarnWriter;
