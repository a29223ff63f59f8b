use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::info;

mod config;
mod console;
mod db;
mod error;
mod lifecycle;
mod models;
mod render;
mod secret;
mod ui;

use clap::Parser;
use config::Config;
use db::{new_executor, HttpGateway, StaticToken};
use lifecycle::InstanceOrchestrator;
use ui::App;

// 全局 panic 处理器
fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // 恢复终端状态
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();

        original_hook(panic_info);
    }));
}

// 终端归界面使用，日志只能写文件
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let config = Config::parse();
    config.validate()?;
    init_logging(&config)?;
    info!(?config, "starting dbdeck");

    let gateway = Arc::new(HttpGateway::new(
        config.base_url()?,
        Arc::new(StaticToken::new(config.token.as_str())),
        config.request_timeout(),
    )?);
    let orchestrator = Arc::new(InstanceOrchestrator::new(gateway.clone()));
    let executor = new_executor(&config, gateway);

    let mut app = App::new(orchestrator, executor, config.query_timeout());
    app.run().await?;

    Ok(())
}
