//! # Member Enrich
//!
//! 读取成员名单，逐个抓取成员主页补全职位、国家和日期信息，输出 CSV 报表。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 名单记录、职位、报表行
//! - `roster_loader` - 解析 SpreadsheetML 名单
//!
//! ### ② 客户端层（Clients）
//! - `ProfileSource` - "取回一位成员的主页"这一能力
//! - `ProfileClient` - 基于 reqwest 的实现（Basic 认证，单次请求）
//!
//! ### ③ 业务能力层（Services）
//! - `profile_extractor` - 从主页提取字段，每个字段独立回落到默认值
//! - `report_writer` - 写 CSV 报表、渲染汇总表格
//! - `report_filter` - 按日期区间和职位筛选已有报表
//!
//! ### ④ 流程层（Workflow）
//! - `MemberCtx` - 上下文封装（用户名 + 序号）
//! - `MemberFlow` - 流程编排（校验 → 请求 → 提取 → 合并）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量成员处理器，管理并发、汇总结果、输出报表
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ProfileClient, ProfileSource};
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use models::{EnrichedMember, Position, RawMember};
pub use orchestrator::{App, EnrichmentOutcome, MemberFailure, RunSummary};
pub use workflow::{MemberCtx, MemberFlow};
