//! 报表写入服务 - 业务能力层
//!
//! 只负责把成员列表写成 CSV，不关心数据从哪来

use crate::error::{AppError, AppResult};
use crate::models::member::EnrichedMember;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 已写入若干数据行（不含表头）
    Written { rows: usize },
    /// 没有任何数据，未创建文件
    NoData,
}

/// 报表写入服务
pub struct ReportWriter {
    output_path: PathBuf,
}

impl ReportWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// 一次性写出整张报表
    ///
    /// 列表为空时不写文件，返回 `NoData`。
    pub fn write(&self, members: &[EnrichedMember]) -> AppResult<WriteOutcome> {
        if members.is_empty() {
            warn!("⚠️ 没有处理任何数据 (no data processed)，不生成报表");
            return Ok(WriteOutcome::NoData);
        }

        let bytes = render_csv(members)?;
        fs::write(&self.output_path, &bytes)
            .map_err(|e| AppError::report_io(self.output_path.display().to_string(), e))?;

        debug!(
            "报表已写入 {} ({} 字节)",
            self.output_path.display(),
            bytes.len()
        );
        Ok(WriteOutcome::Written {
            rows: members.len(),
        })
    }
}

/// 把成员列表序列化为 CSV（含表头）
pub fn render_csv(members: &[EnrichedMember]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for member in members {
        writer.serialize(member)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::report_io("<memory>", e.into_error()))
}

/// 渲染成对齐的文本表格，用于终端输出
pub fn render_table(members: &[EnrichedMember]) -> String {
    let rows: Vec<[String; 9]> = members.iter().map(EnrichedMember::columns).collect();

    let mut widths = EnrichedMember::HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = EnrichedMember::HEADER.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();

    let mut lines = vec![format_line(&header[..]), format_line(&separator[..])];
    lines.extend(rows.iter().map(|row| format_line(&row[..])));
    lines.join("\n")
}
