use crate::error::{AppResult, RosterError};
use crate::models::member::{RawMember, RAW_FIELD_COUNT};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tokio::fs;

/// 从名单文件加载成员列表
pub async fn load_roster(roster_path: &Path) -> AppResult<Vec<RawMember>> {
    let content = fs::read_to_string(roster_path)
        .await
        .map_err(|source| RosterError::ReadFailed {
            path: roster_path.display().to_string(),
            source,
        })?;

    let members = parse_roster(&content)?;
    tracing::info!(
        "成功加载名单 {}: {} 个成员",
        roster_path.display(),
        members.len()
    );
    Ok(members)
}

/// 解析 SpreadsheetML 名单
///
/// 第一行是表头，直接丢弃；用户名为空的行也丢弃。结果按姓氏排序。
pub fn parse_roster(xml: &str) -> AppResult<Vec<RawMember>> {
    let rows = read_rows(xml)?;

    let mut members: Vec<RawMember> = rows
        .into_iter()
        .skip(1)
        .map(RawMember::from_cells)
        .filter(|member| !member.username().is_empty())
        .collect();

    members.sort_by(|a, b| a.last_name().cmp(b.last_name()));
    Ok(members)
}

/// 按文档顺序读出 Worksheet/Table/Row 下每一行的单元格文本
fn read_rows(xml: &str) -> Result<Vec<Vec<String>>, RosterError> {
    let mut reader = Reader::from_str(xml);
    let mut state = RowCollector::default();

    loop {
        let position = reader.buffer_position();
        let xml_err = |source| RosterError::Xml { position, source };

        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                state.open(&e);
                state.stack.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                state.open(&e);
                state.stack.push(e.local_name().as_ref().to_vec());
                state.close();
            }
            Event::End(_) => state.close(),
            Event::Text(t) => {
                if state.in_data() {
                    let text = t.unescape().map_err(xml_err)?;
                    state.push_text(&text);
                }
            }
            Event::CData(t) => {
                if state.in_data() {
                    state.push_text(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.stack.is_empty() {
        return Err(RosterError::Truncated {
            open: state.stack.len(),
        });
    }
    if !state.saw_table {
        return Err(RosterError::MissingTable);
    }
    Ok(state.rows)
}

#[derive(Default)]
struct RowCollector {
    /// 当前打开的元素（本地名）
    stack: Vec<Vec<u8>>,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
    data_depth: Option<usize>,
    saw_table: bool,
}

impl RowCollector {
    fn parent_is(&self, name: &[u8]) -> bool {
        self.stack.last().map(|n| n.as_slice()) == Some(name)
    }

    fn in_data(&self) -> bool {
        self.data_depth.is_some()
    }

    /// 处理开始标签（此时元素还未入栈）
    fn open(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"Table" if self.parent_is(b"Worksheet") => self.saw_table = true,
            b"Row" if self.parent_is(b"Table") && self.stack.len() >= 2 => {
                self.row = Some(Vec::new());
            }
            b"Cell" if self.parent_is(b"Row") => {
                if let (Some(row), Some(index)) = (self.row.as_mut(), cell_index(e)) {
                    // ss:Index 从 1 开始，跳过的列补空（最多补到固定字段数）
                    while row.len() + 1 < index.min(RAW_FIELD_COUNT + 1) {
                        row.push(String::new());
                    }
                }
                self.cell = Some(String::new());
            }
            b"Data" if self.parent_is(b"Cell") && self.cell.is_some() => {
                self.data_depth = Some(self.stack.len());
            }
            _ => {}
        }
    }

    /// 处理结束标签（栈顶元素出栈）
    fn close(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        match name.as_slice() {
            b"Data" if self.data_depth == Some(self.stack.len()) => self.data_depth = None,
            b"Cell" => {
                if let (Some(row), Some(cell)) = (self.row.as_mut(), self.cell.take()) {
                    row.push(cell.trim().to_string());
                }
            }
            b"Row" => {
                if let Some(row) = self.row.take() {
                    self.rows.push(row);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        }
    }
}

fn cell_index(e: &BytesStart<'_>) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"Index")
        .and_then(|attr| {
            std::str::from_utf8(&attr.value)
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn workbook(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
 <Worksheet ss:Name="Members">
  <Table>
   <Row><Cell><Data ss:Type="String">User name</Data></Cell><Cell><Data ss:Type="String">First</Data></Cell><Cell><Data ss:Type="String">Last</Data></Cell></Row>
{}
  </Table>
 </Worksheet>
</Workbook>"#,
            rows
        )
    }

    fn row(cells: &[&str]) -> String {
        let cells: String = cells
            .iter()
            .map(|c| format!("<Cell><Data ss:Type=\"String\">{}</Data></Cell>", c))
            .collect();
        format!("<Row>{}</Row>", cells)
    }

    #[test]
    fn test_drops_header_and_empty_usernames() {
        let rows = [
            row(&["zuser", "Zoe", "Zimmer", "z@x.org", "Uni Z", "extra"]),
            row(&["", "No", "Name", "n@x.org", "Uni N"]),
            row(&["auser", "Al", "Adams", "a@x.org", "Uni A"]),
        ]
        .join("\n");

        let members = parse_roster(&workbook(&rows)).unwrap();

        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| !m.username().is_empty()));
        // 按姓氏排序
        assert_eq!(members[0].username(), "auser");
        assert_eq!(members[1].username(), "zuser");
    }

    #[test]
    fn test_rows_are_padded_and_truncated() {
        let rows = [
            row(&["short", "S", "Short"]),
            row(&["long", "L", "Long", "l@x.org", "Uni", "r", "x", "y"]),
        ]
        .join("\n");

        let members = parse_roster(&workbook(&rows)).unwrap();

        for member in &members {
            assert_eq!(member.fields().len(), 6);
        }
        let short = members.iter().find(|m| m.username() == "short").unwrap();
        assert_eq!(short.email(), "");
        let long = members.iter().find(|m| m.username() == "long").unwrap();
        assert_eq!(long.fields()[5], "r");
    }

    #[test]
    fn test_missing_data_and_cell_index() {
        let rows = r#"<Row>
  <Cell><Data ss:Type="String">jdoe</Data></Cell>
  <Cell/>
  <Cell ss:Index="4"><Data ss:Type="String">j@x.org</Data></Cell>
  <Cell><Data ss:Type="String">Uni &amp; Lab</Data></Cell>
</Row>"#;

        let members = parse_roster(&workbook(rows)).unwrap();

        assert_eq!(members.len(), 1);
        let m = &members[0];
        assert_eq!(m.first_name(), "");
        assert_eq!(m.last_name(), "");
        assert_eq!(m.email(), "j@x.org");
        assert_eq!(m.institute(), "Uni & Lab");
    }

    #[test]
    fn test_huge_cell_index_is_bounded() {
        let rows = r#"<Row>
  <Cell><Data ss:Type="String">jdoe</Data></Cell>
  <Cell ss:Index="50000000"><Data ss:Type="String">far away</Data></Cell>
</Row>"#;

        let members = parse_roster(&workbook(rows)).unwrap();

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username(), "jdoe");
        assert_eq!(members[0].fields().len(), RAW_FIELD_COUNT);
        assert!(members[0].fields()[1..].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_header_only_yields_empty_list() {
        let members = parse_roster(&workbook("")).unwrap();
        assert!(members.is_empty());
    }

    #[test]
    fn test_malformed_document_is_fatal() {
        let broken = "<Workbook><Worksheet><Table><Row><Cell></Row></Table></Worksheet></Workbook>";
        assert!(matches!(
            parse_roster(broken),
            Err(AppError::Roster(RosterError::Xml { .. }))
        ));

        let truncated = "<Workbook><Worksheet><Table><Row>";
        assert!(matches!(
            parse_roster(truncated),
            Err(AppError::Roster(RosterError::Truncated { .. }))
        ));

        let no_table = "<Workbook></Workbook>";
        assert!(matches!(
            parse_roster(no_table),
            Err(AppError::Roster(RosterError::MissingTable))
        ));
    }

    #[test]
    fn test_load_roster_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("membertable.xml");
        std::fs::write(&path, workbook(&row(&["jdoe", "Jane", "Doe", "j@x.org", "Uni"]))).unwrap();

        let members = tokio_test::block_on(load_roster(&path)).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].last_name(), "Doe");

        let missing = tokio_test::block_on(load_roster(&dir.path().join("nope.xml")));
        assert!(matches!(
            missing,
            Err(AppError::Roster(RosterError::ReadFailed { .. }))
        ));
    }
}
