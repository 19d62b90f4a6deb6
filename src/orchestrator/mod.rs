//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文档处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载页面清单（Vec<PageManifest>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `paper_processor` - 单个文档处理器
//! - 委托 SegmentFlow 完成分段
//! - 写出 JSON 分段报告
//! - 输出单个文档的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PageManifest>)
//!     ↓
//! paper_processor (处理单个 PageManifest)
//!     ↓
//! workflow::SegmentFlow (身份 → 分类 → 状态机 → 组装)
//!     ↓
//! services (能力层：identity / classifier / segmentation / assembler / warn)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，paper_processor 管单个
//! 2. **文档隔离**：每份文档各自持有分段状态，互不共享
//! 3. **向下依赖**：编排层 → workflow → services → models
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use paper_processor::{process_paper, write_report};
