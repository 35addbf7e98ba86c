/// 日志工具模块
///
/// 提供日志初始化、报告文件和统计输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppResult;

/// 初始化日志输出
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 `debug` 或 `info`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化报告文件
///
/// # 参数
/// - `log_file_path`: 报告文件路径
/// - `title`: 报告标题
pub fn init_log_file(log_file_path: &str, title: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n{} - {}\n{}\n\n",
        "=".repeat(60),
        title,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向报告文件追加内容
pub fn append_log(log_file_path: &str, text: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `base_url`: LMS 站点
/// - `max_concurrent`: 最大并发数
pub fn log_startup(base_url: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 课程内容检查");
    info!("🌐 站点: {}", base_url);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `passed`: 通过数量
/// - `failed`: 未通过数量
/// - `unknown`: 无法判断或未执行的数量
/// - `fixed`: 修复成功数量
/// - `log_file_path`: 报告文件路径
pub fn print_final_stats(passed: usize, failed: usize, unknown: usize, fixed: usize, log_file_path: &str) {
    let total = passed + failed + unknown;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部检查完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}/{}", passed, total);
    info!("❌ 未通过: {}", failed);
    info!("❔ 未知: {}", unknown);
    if fixed > 0 {
        info!("🔧 已修复: {}", fixed);
    }
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("课程内容检查工具", 4), "课程内容...");
    }

    #[test]
    fn test_report_file_header_and_append() {
        let path = std::env::temp_dir().join(format!("lms_content_report_{}.txt", std::process::id()));
        let path = path.to_string_lossy().to_string();

        init_log_file(&path, "课程检查报告").unwrap();
        append_log(&path, "due_dates: 通过\n").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("课程检查报告 - "));
        assert!(content.ends_with("due_dates: 通过\n"));
    }
}
