use anyhow::Result;
use clap::Parser;
use member_enrich::{logger, App, Config};
use std::path::PathBuf;

/// 补全成员名单并生成 CSV 报表
#[derive(Parser, Debug)]
#[command(name = "member_enrich", version)]
struct Cli {
    /// TOML 配置文件
    #[arg(long, env = "MEMBER_ENRICH_CONFIG")]
    config: Option<PathBuf>,

    /// 名单 XML 文件（覆盖配置）
    #[arg(long)]
    roster: Option<String>,

    /// 输出报表路径（覆盖配置）
    #[arg(long)]
    output: Option<String>,

    /// 最大并发数（覆盖配置）
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(roster) = cli.roster {
        config.roster_path = roster;
    }
    if let Some(output) = cli.output {
        config.output_csv = output;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_members = concurrency;
    }

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    // 初始化并运行应用
    let summary = App::initialize(config)?.run().await?;

    if !summary.report_written {
        println!("没有有效数据 (no data processed)");
    }

    Ok(())
}
