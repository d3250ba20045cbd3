use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use member_enrich::services::{read_report, render_table, ReportFilter};
use member_enrich::{logger, Position};
use std::path::PathBuf;
use tracing::info;

/// 按入会日期和职位筛选已生成的报表
#[derive(Parser, Debug)]
#[command(name = "filter_report", version)]
struct Args {
    /// 报表文件
    #[arg(default_value = "members_report.csv")]
    report: PathBuf,

    /// 入会日期晚于（不含），格式 YYYY-MM-DD
    #[arg(long)]
    after: Option<NaiveDate>,

    /// 入会日期不晚于（含），格式 YYYY-MM-DD
    #[arg(long)]
    until: Option<NaiveDate>,

    /// 职位：Student MSc / Student PhD / Postdoc / Faculty
    #[arg(long)]
    position: Option<Position>,
}

fn main() -> Result<()> {
    logger::init();
    let args = Args::parse();

    let members = read_report(&args.report)
        .with_context(|| format!("无法读取报表: {}", args.report.display()))?;
    let total = members.len();

    let filter = ReportFilter {
        after: args.after,
        until: args.until,
        position: args.position,
    };
    let selected = filter.apply(members);

    info!("筛选结果: {}/{} 位成员", selected.len(), total);
    println!("{}", render_table(&selected));

    Ok(())
}
