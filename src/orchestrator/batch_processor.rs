//! 批量成员处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量成员的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建主页客户端
//! 2. **名单加载**：读取并解析名单（`Vec<RawMember>`）
//! 3. **并发控制**：使用 Semaphore 限制同时请求的成员数量
//! 4. **结果汇总**：按完成顺序收集结果，失败的成员单独记录
//! 5. **报表输出**：排序、写 CSV、打印汇总表格和统计
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个成员的细节，委托给 `MemberFlow`
//! - **单一消费者**：结果只在本任务内通过 `FuturesUnordered` 汇总，任务之间没有共享的可变状态
//! - **错误隔离**：单个成员失败只记录日志，不影响其他成员

use crate::clients::{ProfileClient, ProfileSource};
use crate::config::Config;
use crate::error::{AppError, AppResult, MemberError};
use crate::models::{self, EnrichedMember, RawMember};
use crate::services::{render_table, ReportWriter, WriteOutcome};
use crate::utils::logging::{
    log_progress, log_roster_loaded, log_startup, log_summary_table, print_final_stats,
    should_report_progress,
};
use crate::workflow::{MemberCtx, MemberFlow};
use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<S = ProfileClient> {
    config: Config,
    source: Arc<S>,
}

impl App<ProfileClient> {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let client = ProfileClient::new(&config).context("无法创建 HTTP 客户端")?;
        let app = Self::with_source(config, client)?;

        log_startup(app.config.max_concurrent_members, &app.config.base_url);
        Ok(app)
    }
}

impl<S: ProfileSource + 'static> App<S> {
    /// 使用指定的主页来源创建应用
    ///
    /// 配置不合法（例如并发数为 0）时直接返回错误。
    pub fn with_source(config: Config, source: S) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source: Arc::new(source),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let members = self.load_members().await?;
        let total = members.len();

        if members.is_empty() {
            warn!("⚠️ 名单中没有有效成员");
        }
        log_roster_loaded(total, self.config.max_concurrent_members);

        let mut outcome = self.enrich_members(members).await;

        if self.config.sort_report {
            sort_members(&mut outcome.members);
        }

        let writer = ReportWriter::new(&self.config.output_csv);
        let write_outcome = writer
            .write(&outcome.members)
            .with_context(|| format!("无法写入报表: {}", self.config.output_csv))?;
        let report_written = matches!(write_outcome, WriteOutcome::Written { .. });

        if report_written {
            log_summary_table(&render_table(&outcome.members));
        }
        print_final_stats(
            outcome.members.len(),
            outcome.failures.len(),
            total,
            report_written.then_some(self.config.output_csv.as_str()),
        );

        Ok(RunSummary {
            total,
            succeeded: outcome.members.len(),
            failures: outcome.failures,
            report_written,
        })
    }

    /// 加载名单
    async fn load_members(&self) -> Result<Vec<RawMember>> {
        info!("\n📁 正在读取名单 {} ...", self.config.roster_path);
        models::load_roster(Path::new(&self.config.roster_path))
            .await
            .with_context(|| format!("无法加载名单: {}", self.config.roster_path))
    }

    /// 并发处理所有成员
    ///
    /// 返回的成员按完成顺序排列，与名单顺序无关。
    pub async fn enrich_members(&self, members: Vec<RawMember>) -> EnrichmentOutcome {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_members));
        let flow = Arc::new(MemberFlow::new(&self.config));
        let total = members.len();

        // 为每位成员创建任务，任务内部先拿许可再发请求
        let mut pending: FuturesUnordered<_> = members
            .into_iter()
            .enumerate()
            .map(|(idx, member)| {
                let ctx = MemberCtx::new(member.username(), idx + 1, total);
                let task_ctx = ctx.clone();
                let semaphore = Arc::clone(&semaphore);
                let flow = Arc::clone(&flow);
                let source = Arc::clone(&self.source);

                let handle = tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return Err(AppError::from(MemberError::TaskAborted {
                                username: task_ctx.username.clone(),
                                reason: e.to_string(),
                            }))
                        }
                    };
                    flow.run(source.as_ref(), &member, &task_ctx).await
                });

                async move { (ctx, handle.await) }
            })
            .collect();

        // 按完成顺序汇总结果
        let mut outcome = EnrichmentOutcome::default();
        let mut completed = 0;

        while let Some((ctx, joined)) = pending.next().await {
            if should_report_progress(completed, self.config.progress_every) {
                log_progress(&ctx.username, completed, total);
            }
            completed += 1;

            let result = joined.unwrap_or_else(|e| {
                Err(AppError::from(MemberError::TaskAborted {
                    username: ctx.username.clone(),
                    reason: e.to_string(),
                }))
            });

            match result {
                Ok(member) => outcome.members.push(member),
                Err(e) => {
                    error!("{} ❌ 处理失败，已跳过: {}", ctx, e);
                    outcome.failures.push(MemberFailure {
                        username: ctx.username,
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

/// 按 姓、名、用户名 排序
pub fn sort_members(members: &mut [EnrichedMember]) {
    members.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.username.cmp(&b.username))
    });
}

/// 处理失败的成员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFailure {
    pub username: String,
    pub reason: String,
}

/// 一次批量处理的结果
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    /// 成功的成员（完成顺序）
    pub members: Vec<EnrichedMember>,
    pub failures: Vec<MemberFailure>,
}

/// 整次运行的统计
#[derive(Debug)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<MemberFailure>,
    pub report_written: bool,
}
