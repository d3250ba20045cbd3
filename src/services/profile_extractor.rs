//! 成员主页字段提取 - 业务能力层
//!
//! 只负责"从主页里读出字段"，不关心网络和流程。
//!
//! 每个字段独立提取，各自有默认值：
//!
//! | 字段 | 来源 | 默认值 |
//! |---|---|---|
//! | 最近贡献 | 贡献列表的第一个标题 | `0001-01-01` |
//! | 国家 | 第二段文字中最后一对括号 | `Unknown` |
//! | 职位 | 第二段文字中的固定短语 | `Faculty` |
//! | 入会日期 | 第三段文字 `T2K member since: YYYY/MM` | `1970-01-01`（段落缺失时） |
//!
//! 入会日期段落存在但格式不对时返回 `FieldError`，其余字段照常提取。

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::FieldError;
use crate::models::member::{
    default_member_since, no_contribution_date, Position, ProfileFields,
};

/// 最近贡献列表
pub const CONTRIBUTION_LIST_SELECTOR: &str = ".latest-contributions, #latest-contributions";
/// 贡献列表内的标题
pub const CONTRIBUTION_HEADER_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
/// 入会日期段落的前缀
pub const MEMBER_SINCE_PREFIX: &str = "T2K member since: ";
/// 国家缺失时的取值
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// 解析后的成员主页
///
/// 只在单个任务内部短暂存在，提取完即丢弃。
pub struct ProfileDocument {
    html: Html,
}

impl ProfileDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// 第 `index` 个 `<p>` 段落的文本（去掉首尾空白）
    fn paragraph(&self, index: usize) -> Option<String> {
        let selector = Selector::parse("p").ok()?;
        self.html
            .select(&selector)
            .nth(index)
            .map(|p| p.text().collect::<String>().trim().to_string())
    }

    /// 贡献列表第一个标题的文本
    fn first_contribution_header(&self) -> Option<String> {
        let list = Selector::parse(CONTRIBUTION_LIST_SELECTOR).ok()?;
        let header = Selector::parse(CONTRIBUTION_HEADER_SELECTOR).ok()?;
        let list = self.html.select(&list).next()?;
        let first = list.select(&header).next()?;
        Some(first.text().collect::<String>().trim().to_string())
    }
}

/// 提取全部字段，不会失败
pub fn extract_profile(document: &ProfileDocument) -> ProfileFields {
    let position_text = document.paragraph(1).unwrap_or_default();

    ProfileFields {
        position: Position::classify(&position_text),
        country: extract_country(&position_text),
        member_since: extract_member_since(document.paragraph(2).as_deref()),
        last_contribution: extract_last_contribution(document),
    }
}

/// 最后一个 `(` 与其后 `)` 之间的文字；没有括号时为 `Unknown`
pub fn extract_country(text: &str) -> String {
    let Some(open) = text.rfind('(') else {
        return UNKNOWN_COUNTRY.to_string();
    };
    let rest = &text[open + 1..];
    let country = match rest.find(')') {
        Some(close) => &rest[..close],
        None => rest,
    };
    let country = country.trim();
    if country.is_empty() {
        UNKNOWN_COUNTRY.to_string()
    } else {
        country.to_string()
    }
}

/// 解析入会日期段落
///
/// 段落缺失 → `1970-01-01`；段落存在但不是 `YYYY/MM` → `FieldError`。
pub fn extract_member_since(paragraph: Option<&str>) -> Result<NaiveDate, FieldError> {
    let Some(paragraph) = paragraph else {
        return Ok(default_member_since());
    };
    let raw = paragraph.replace(MEMBER_SINCE_PREFIX, "");
    parse_year_month(raw.trim()).ok_or(FieldError::Unparsable {
        field: "member_since",
        raw: raw.trim().to_string(),
    })
}

/// 读取最近贡献日期，任何失败都回落到 `0001-01-01`
pub fn extract_last_contribution(document: &ProfileDocument) -> NaiveDate {
    document
        .first_contribution_header()
        .and_then(|header| parse_month_day_year(&header))
        .unwrap_or_else(no_contribution_date)
}

/// `YYYY/MM`，日取 1 号
fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^(\d{4})/(\d{1,2})$").ok()?;
    let caps = re.captures(raw)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// 在文本中找 `March 5, 2021` / `Mar 5 2021` 形式的日期
fn parse_month_day_year(text: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})").ok()?;
    let found = re.captures_iter(text).find_map(|caps| {
        let candidate = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        NaiveDate::parse_from_str(&candidate, "%B %d %Y")
            .or_else(|_| NaiveDate::parse_from_str(&candidate, "%b %d %Y"))
            .ok()
    });
    found
}
