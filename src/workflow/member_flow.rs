//! 成员处理流程 - 流程层
//!
//! 核心职责：定义"一位成员"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验名单记录（不合法则不发请求）
//! 2. 请求成员主页
//! 3. 提取字段
//! 4. 与名单记录合并为报表行

use tracing::{debug, info};

use crate::clients::ProfileSource;
use crate::config::Config;
use crate::error::{AppResult, MemberError};
use crate::models::member::{EnrichedMember, ProfileFields, RawMember};
use crate::services::profile_extractor::{extract_profile, ProfileDocument};
use crate::workflow::member_ctx::MemberCtx;

/// 合法记录至少需要的非空字段数
pub const MIN_POPULATED_FIELDS: usize = 5;

/// 成员处理流程
///
/// - 不持有网络资源，由调用方传入 `ProfileSource`
/// - 只处理单个成员
pub struct MemberFlow {
    verbose_logging: bool,
}

impl MemberFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run<S: ProfileSource>(
        &self,
        source: &S,
        member: &RawMember,
        ctx: &MemberCtx,
    ) -> AppResult<EnrichedMember> {
        validate(member)?;

        debug!("{} 🔍 请求成员主页", ctx);
        let body = source.fetch_profile(member.username()).await?;

        let fields = extract_profile(&ProfileDocument::parse(&body));
        self.log_fields(ctx, &fields);

        combine(member, fields)
    }

    fn log_fields(&self, ctx: &MemberCtx, fields: &ProfileFields) {
        if self.verbose_logging {
            info!(
                "{} 职位: {}, 国家: {}, 入会: {:?}, 最近贡献: {}",
                ctx, fields.position, fields.country, fields.member_since, fields.last_contribution
            );
        }
    }
}

/// 校验名单记录：用户名非空且至少有 5 个非空字段
pub fn validate(member: &RawMember) -> Result<(), MemberError> {
    let populated = member.populated_count();
    if member.username().trim().is_empty() || populated < MIN_POPULATED_FIELDS {
        return Err(MemberError::InvalidRecord {
            username: member.username().to_string(),
            populated,
        });
    }
    Ok(())
}

/// 合并名单记录与主页字段
///
/// 入会日期无法解析时整条记录失败。
pub fn combine(member: &RawMember, fields: ProfileFields) -> AppResult<EnrichedMember> {
    let member_since = fields
        .member_since
        .map_err(|source| MemberError::MemberSince {
            username: member.username().to_string(),
            source,
        })?;

    Ok(EnrichedMember::new(
        member,
        fields.position,
        fields.country,
        member_since,
        fields.last_contribution,
    ))
}
