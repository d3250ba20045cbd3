//! 报表筛选服务
//!
//! 读取已生成的报表，按入会日期区间和职位挑选成员。

use crate::error::AppResult;
use crate::models::member::{EnrichedMember, Position};
use chrono::NaiveDate;
use std::path::Path;

/// 筛选条件，未设置的条件不参与判断
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// 入会日期必须晚于该日期（不含）
    pub after: Option<NaiveDate>,
    /// 入会日期不晚于该日期（含）
    pub until: Option<NaiveDate>,
    /// 职位必须完全一致
    pub position: Option<Position>,
}

impl ReportFilter {
    pub fn matches(&self, member: &EnrichedMember) -> bool {
        self.after.map_or(true, |after| member.member_since > after)
            && self.until.map_or(true, |until| member.member_since <= until)
            && self.position.map_or(true, |position| member.position == position)
    }

    pub fn apply(&self, members: Vec<EnrichedMember>) -> Vec<EnrichedMember> {
        members.into_iter().filter(|m| self.matches(m)).collect()
    }
}

/// 读取报表文件
pub fn read_report(path: &Path) -> AppResult<Vec<EnrichedMember>> {
    let mut reader = csv::Reader::from_path(path)?;
    let members = reader
        .deserialize()
        .collect::<Result<Vec<EnrichedMember>, csv::Error>>()?;
    Ok(members)
}
