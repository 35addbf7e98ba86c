//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lms_content::ContentKind;

#[derive(Parser, Debug)]
#[command(
    name = "lms-content",
    version,
    about = "课程内容检查与修复工具",
    long_about = "通过 LMS REST API 读取课程中的作业、讨论、页面和测验，执行检查项，并可自动修复部分问题。"
)]
pub struct Cli {
    /// TOML 配置文件，环境变量会覆盖其中的值
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 对课程执行检查项
    ///
    /// 例: lms-content check --course 42 --rule due_dates --fix
    Check {
        /// 课程ID
        #[arg(long)]
        course: u64,

        /// 只执行指定的检查项（可重复），默认全部
        #[arg(long = "rule")]
        rules: Vec<String>,

        /// 修复未通过且支持修复的检查项
        #[arg(long)]
        fix: bool,
    },

    /// 列出课程中某类内容
    List {
        /// 课程ID
        #[arg(long)]
        course: u64,

        /// 内容类型
        #[arg(long, value_enum)]
        kind: KindArg,
    },

    /// 根据页面或 API 地址显示一条内容
    Show {
        /// 例如 https://lms.example.edu/courses/42/pages/7
        url: String,
    },

    /// 列出全部检查项
    Rules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Assignment,
    Discussion,
    Page,
    Quiz,
}

impl From<KindArg> for ContentKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Assignment => ContentKind::Assignment,
            KindArg::Discussion => ContentKind::Discussion,
            KindArg::Page => ContentKind::Page,
            KindArg::Quiz => ContentKind::Quiz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_with_rules() {
        let cli = Cli::parse_from([
            "lms-content", "check", "--course", "42", "--rule", "due_dates", "--rule", "insecure_links", "--fix",
        ]);
        match cli.command {
            Commands::Check { course, rules, fix } => {
                assert_eq!(course, 42);
                assert_eq!(rules, vec!["due_dates", "insecure_links"]);
                assert!(fix);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_kind() {
        let cli = Cli::parse_from(["lms-content", "-v", "list", "--course", "1", "--kind", "discussion"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::List { kind, .. } => assert_eq!(ContentKind::from(kind), ContentKind::Discussion),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
