use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// 名单记录的固定字段数
pub const RAW_FIELD_COUNT: usize = 6;

/// 名单中的一条原始记录
///
/// 字段顺序：用户名、名、姓、邮箱、单位、保留字段。缺失的字段补为空字符串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMember {
    fields: [String; RAW_FIELD_COUNT],
}

impl RawMember {
    /// 从任意长度的单元格列表构造：不足补空，多余截断
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: [String; RAW_FIELD_COUNT] = Default::default();
        for (slot, cell) in fields.iter_mut().zip(cells) {
            *slot = cell.into();
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[String; RAW_FIELD_COUNT] {
        &self.fields
    }

    pub fn username(&self) -> &str {
        &self.fields[0]
    }

    pub fn first_name(&self) -> &str {
        &self.fields[1]
    }

    pub fn last_name(&self) -> &str {
        &self.fields[2]
    }

    pub fn email(&self) -> &str {
        &self.fields[3]
    }

    pub fn institute(&self) -> &str {
        &self.fields[4]
    }

    /// 非空字段个数
    pub fn populated_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.trim().is_empty()).count()
    }
}

/// 成员职位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Student MSc")]
    StudentMsc,
    #[serde(rename = "Student PhD")]
    StudentPhd,
    #[serde(rename = "Postdoc")]
    Postdoc,
    #[serde(rename = "Faculty")]
    Faculty,
}

impl Position {
    /// 主页上的识别短语，按优先级排列
    pub const PHRASES: [(&'static str, Position); 3] = [
        ("Grad student (MSc)", Position::StudentMsc),
        ("Grad student (PhD)", Position::StudentPhd),
        ("Postdoc", Position::Postdoc),
    ];

    /// 报表中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            Position::StudentMsc => "Student MSc",
            Position::StudentPhd => "Student PhD",
            Position::Postdoc => "Postdoc",
            Position::Faculty => "Faculty",
        }
    }

    /// 从职位描述文本分类（区分大小写），都不匹配时为 Faculty
    pub fn classify(text: &str) -> Self {
        Self::PHRASES
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, position)| *position)
            .unwrap_or(Position::Faculty)
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Student MSc" => Ok(Position::StudentMsc),
            "Student PhD" => Ok(Position::StudentPhd),
            "Postdoc" => Ok(Position::Postdoc),
            "Faculty" => Ok(Position::Faculty),
            other => Err(format!(
                "未知职位 {:?}，可选: Student MSc, Student PhD, Postdoc, Faculty",
                other
            )),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 从成员主页提取出的字段
///
/// 入会日期是唯一可能失败的字段，其余字段总有默认值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub position: Position,
    pub country: String,
    pub member_since: Result<NaiveDate, FieldError>,
    pub last_contribution: NaiveDate,
}

/// 报表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMember {
    #[serde(rename = "First name")]
    pub first_name: String,
    #[serde(rename = "Last name")]
    pub last_name: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Institute")]
    pub institute: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Position")]
    pub position: Position,
    #[serde(rename = "Member since")]
    pub member_since: NaiveDate,
    #[serde(rename = "Last contribution")]
    pub last_contribution: NaiveDate,
}

impl EnrichedMember {
    /// 报表表头
    pub const HEADER: [&'static str; 9] = [
        "First name",
        "Last name",
        "Username",
        "Email",
        "Institute",
        "Country",
        "Position",
        "Member since",
        "Last contribution",
    ];

    pub fn new(
        raw: &RawMember,
        position: Position,
        country: String,
        member_since: NaiveDate,
        last_contribution: NaiveDate,
    ) -> Self {
        Self {
            first_name: raw.first_name().to_string(),
            last_name: raw.last_name().to_string(),
            username: raw.username().to_string(),
            email: raw.email().to_string(),
            institute: raw.institute().to_string(),
            country,
            position,
            member_since,
            last_contribution,
        }
    }

    /// 按表头顺序输出各列文本
    pub fn columns(&self) -> [String; 9] {
        [
            self.first_name.clone(),
            self.last_name.clone(),
            self.username.clone(),
            self.email.clone(),
            self.institute.clone(),
            self.country.clone(),
            self.position.to_string(),
            self.member_since.format("%Y-%m-%d").to_string(),
            self.last_contribution.format("%Y-%m-%d").to_string(),
        ]
    }
}

/// 没有找到任何贡献时使用的占位日期 0001-01-01
pub fn no_contribution_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}

/// 主页上没有入会日期时使用的默认值 1970-01-01
pub fn default_member_since() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_pads_and_truncates() {
        let short = RawMember::from_cells(["jdoe", "Jane"]);
        assert_eq!(short.fields().len(), RAW_FIELD_COUNT);
        assert_eq!(short.first_name(), "Jane");
        assert_eq!(short.institute(), "");

        let long = RawMember::from_cells(["a", "b", "c", "d", "e", "f", "g", "h"]);
        assert_eq!(long.fields()[5], "f");
        assert_eq!(long.populated_count(), 6);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(Position::classify("Postdoc (France)"), Position::Postdoc);
        assert_eq!(
            Position::classify("Grad student (PhD), Postdoc (Japan)"),
            Position::StudentPhd
        );
        assert_eq!(
            Position::classify("Postdoc, Grad student (PhD), Grad student (MSc)"),
            Position::StudentMsc
        );
        assert_eq!(Position::classify("Professor (UK)"), Position::Faculty);
        // 区分大小写
        assert_eq!(Position::classify("postdoc (UK)"), Position::Faculty);
    }

    #[test]
    fn test_position_round_trips_through_name() {
        for position in [
            Position::StudentMsc,
            Position::StudentPhd,
            Position::Postdoc,
            Position::Faculty,
        ] {
            assert_eq!(position.name().parse::<Position>(), Ok(position));
        }
        assert!("Permanent".parse::<Position>().is_err());
    }

    #[test]
    fn test_sentinel_dates() {
        assert_eq!(no_contribution_date().to_string(), "0001-01-01");
        assert_eq!(default_member_since().to_string(), "1970-01-01");
    }
}
