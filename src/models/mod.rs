pub mod component;
pub mod exam_identity;
pub mod loaders;
pub mod manifest;
pub mod question;

pub use component::{Component, DocVariant, Session};
pub use exam_identity::ExamIdentity;
pub use loaders::{load_all_manifests, load_manifest};
pub use manifest::{PageManifest, ReplyEntry};
pub use question::{
    Difficulty, ExplanationReply, ImageHandle, Page, PageImage, QuestionKey, QuestionRecord,
};
