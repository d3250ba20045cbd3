//! 成员处理上下文
//!
//! 封装"我正在处理名单里的哪一位成员"这一信息

use std::fmt::Display;

/// 成员处理上下文
#[derive(Debug, Clone)]
pub struct MemberCtx {
    /// 用户名
    pub username: String,

    /// 在名单中的序号（从1开始，仅用于日志显示）
    pub member_index: usize,

    /// 名单总人数
    pub total: usize,
}

impl MemberCtx {
    pub fn new(username: impl Into<String>, member_index: usize, total: usize) -> Self {
        Self {
            username: username.into(),
            member_index,
            total,
        }
    }
}

impl Display for MemberCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[成员 {}/{} {}]",
            self.member_index, self.total, self.username
        )
    }
}
