/// 日志工具模块
///
/// 提供运行过程中横幅、进度和统计信息的输出
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `base_url`: 成员主页站点
pub fn log_startup(max_concurrent: usize, base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 成员信息补全模式");
    info!("🌐 主页站点: {}", base_url);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录名单加载信息
pub fn log_roster_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 名单中共有 {} 位待处理的成员", total);
    info!("📋 同时最多处理 {} 位\n", max_concurrent);
}

/// 是否需要在第 `completed` 次完成时输出进度（从 0 计）
pub fn should_report_progress(completed: usize, every: usize) -> bool {
    every > 0 && completed % every == 0
}

/// 进度行文本
///
/// # 参数
/// - `username`: 刚完成的成员
/// - `completed`: 此前已完成的数量（从 0 计）
/// - `total`: 成员总数
pub fn progress_message(username: &str, completed: usize, total: usize) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };
    format!(
        "处理成员 {}, {}/{} ({:.2}%)",
        username, completed, total, percent
    )
}

/// 输出进度
pub fn log_progress(username: &str, completed: usize, total: usize) {
    info!("⏳ {}", progress_message(username, completed, total));
}

/// 输出汇总表格
pub fn log_summary_table(table: &str) {
    info!("\n{}", "─".repeat(60));
    for line in table.lines() {
        info!("{}", line);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `output_path`: 报表路径，未写出报表时为 `None`
pub fn print_final_stats(success: usize, failed: usize, total: usize, output_path: Option<&str>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    match output_path {
        Some(path) => info!("\n报表已保存至: {}", path),
        None => info!("\n没有有效数据，未生成报表"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_cadence() {
        let reported: Vec<usize> = (0..45).filter(|i| should_report_progress(*i, 20)).collect();
        assert_eq!(reported, vec![0, 20, 40]);
        assert!(!should_report_progress(0, 0));
    }

    #[test]
    fn test_progress_message_rounds_to_two_decimals() {
        assert_eq!(
            progress_message("jdoe", 1, 3),
            "处理成员 jdoe, 1/3 (33.33%)"
        );
        assert_eq!(progress_message("a", 0, 0), "处理成员 a, 0/0 (0.00%)");
    }
}
