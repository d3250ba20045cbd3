//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RawMember>)
//!     ↓
//! workflow::MemberFlow (处理单个成员)
//!     ↓
//! clients::ProfileSource (请求主页) + services (提取字段 / 写报表)
//! ```
//!
//! 编排层只做调度和统计，不做具体的字段判断。

pub mod batch_processor;

pub use batch_processor::{App, EnrichmentOutcome, MemberFailure, RunSummary};
