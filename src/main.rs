mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use futures::TryStreamExt;
use tracing::{info, warn};

use cli::{Cli, Commands};
use lms_content::content_kind::content_from_url;
use lms_content::utils::logging;
use lms_content::validations::{catalog, Validation};
use lms_content::{CanvasClient, Config, ContentKind, ContentLookup, ValidationRunner};

/// 退出码：0 全部通过，1 有未通过或未找到，2 出错
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    config.validate()?;

    match cli.command {
        Commands::Rules => {
            for validation in catalog() {
                let fixable = if validation.is_fixable() { " (可修复)" } else { "" };
                println!("{:<26}{}{}", validation.name(), validation.description(), fixable);
            }
            Ok(0)
        }
        Commands::Check { course, rules, fix } => {
            let validations = select_rules(&rules)?;
            let runner = ValidationRunner::new(config)?;
            let report = runner.run(course, validations, fix).await?;
            Ok(if report.stats.failed > 0 { 1 } else { 0 })
        }
        Commands::List { course, kind } => {
            let kind = ContentKind::from(kind);
            let client = build_client(&config)?;
            let mut contents = kind.data_generator(&client, course, None);
            let mut count = 0usize;
            while let Some(content) = contents.try_next().await? {
                println!("{:>10}  {}", content.id(), content.name());
                count += 1;
            }
            info!("✓ 共 {} 条{}", count, kind);
            Ok(0)
        }
        Commands::Show { url } => {
            let client = build_client(&config)?;
            match content_from_url(&client, &url, None).await? {
                None => {
                    warn!("⚠️ 无法识别的内容地址: {}", url);
                    Ok(2)
                }
                Some(ContentLookup::NotFound { message }) => {
                    warn!("⚠️ 内容不存在: {}", message);
                    Ok(1)
                }
                Some(ContentLookup::Found(content)) => {
                    println!("{}", serde_json::to_string_pretty(&content)?);
                    Ok(0)
                }
            }
        }
    }
}

fn build_client(config: &Config) -> Result<CanvasClient> {
    Ok(CanvasClient::new(config)?.with_list_config(config.list_call_config()))
}

/// 按名称选择检查项，为空时返回全部
fn select_rules(names: &[String]) -> Result<Vec<Box<dyn Validation>>> {
    if names.is_empty() {
        return Ok(catalog());
    }
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match lms_content::validations::find(name) {
            Some(validation) => selected.push(validation),
            None => bail!("未知的检查项: {}（使用 `lms-content rules` 查看全部）", name),
        }
    }
    Ok(selected)
}
