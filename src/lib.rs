//! # Exam Paper Segmenter
//!
//! 把考试 PDF（试题卷 / 评分标准）的逐页文本切分成按题目组织的记录
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 纯数据：考试身份、页面、题号、输出记录、页面清单
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个模块只管一件事
//! - `identity_parser` - 文件名 → 考试身份
//! - `PageClassifier` - 单页 → 分类结论（有序规则表）
//! - `Segmenter` - 分类结论 → 状态机推进 → 分段终态
//! - `RecordAssembler` - 分段终态 → 输出记录 + 诊断
//! - `apply_replies` - 讲解回复回填
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份文档"的完整处理流程
//! - `DocumentCtx` - 上下文封装（文档索引 + 文件名）
//! - `SegmentFlow` - 流程编排（身份 → 分段 → 组装 → 回填 → 诊断）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文档处理器，管理并发
//! - `orchestrator/paper_processor` - 单个文档处理器，写出 JSON 报告
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ExamIdentity, Page, PageManifest, QuestionKey, QuestionRecord};
pub use orchestrator::{process_paper, App};
pub use services::{PageClassifier, Segmenter};
pub use workflow::{DocumentCtx, ProcessResult, SegmentFlow};
