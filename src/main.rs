mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    telascripts::logger::init_logger();

    let cli = Cli::parse();
    cli::run(cli).await
}
