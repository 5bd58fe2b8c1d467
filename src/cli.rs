use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use telascripts::config::ConfigLoader;
use telascripts::form::{AuthForm, KeyValueRow, RequestForm};
use telascripts::history::{HistoryStore, printer};
use telascripts::http::{AuthType, Client};
use telascripts::runner::{RequestComposer, RequestExecutor};
use telascripts::utils::{ResponseFormat, ResponseFormatter};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 发送请求并记录到历史
    Send(SendArgs),
    /// 查看或清空请求历史
    History {
        /// 最多显示的条数
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// 清空历史
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct SendArgs {
    /// 请求 URL (相对路径基于配置中的 base_url)
    pub url: String,

    #[arg(short = 'X', long = "request", default_value = "GET")]
    pub method: String,

    /// 请求头，格式 "Name: value"
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// 查询参数，格式 "key=value"
    #[arg(short = 'q', long = "query")]
    pub params: Vec<String>,

    /// 请求体
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    #[arg(long, conflicts_with_all = ["basic", "api_key"])]
    pub bearer: Option<String>,

    /// 格式 "user:password"
    #[arg(long, conflicts_with = "api_key")]
    pub basic: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    /// 显示响应头
    #[arg(short, long)]
    pub verbose: bool,

    /// 不输出响应体
    #[arg(long)]
    pub no_body: bool,

    /// 不输出耗时
    #[arg(long)]
    pub no_timing: bool,
}

fn parse_pairs(raw: &[String], separator: char, what: &str) -> Result<Vec<KeyValueRow>> {
    raw.iter()
        .map(|item| match item.split_once(separator) {
            Some((key, value)) => Ok(KeyValueRow::new(key.trim(), value.trim())),
            None => bail!("invalid {what} {item:?}, expected key{separator}value"),
        })
        .collect()
}

impl SendArgs {
    pub fn to_form(&self) -> Result<RequestForm> {
        let mut method = self.method.to_uppercase();
        // 有请求体且未指定方法时默认使用 POST
        if self.body.is_some() && method == "GET" {
            method = String::from("POST");
        }

        let authorization = if let Some(token) = &self.bearer {
            AuthForm {
                kind: AuthType::Bearer,
                token: token.clone(),
                ..Default::default()
            }
        } else if let Some(credentials) = &self.basic {
            let (username, password) = credentials
                .split_once(':')
                .unwrap_or((credentials.as_str(), ""));
            AuthForm {
                kind: AuthType::Basic,
                username: username.to_string(),
                password: password.to_string(),
                ..Default::default()
            }
        } else if let Some(key) = &self.api_key {
            AuthForm {
                kind: AuthType::ApiKey,
                token: key.clone(),
                ..Default::default()
            }
        } else {
            AuthForm::default()
        };

        Ok(RequestForm {
            method,
            url: self.url.clone(),
            headers: parse_pairs(&self.headers, ':', "header")?,
            params: parse_pairs(&self.params, '=', "query parameter")?,
            body: self.body.clone().unwrap_or_default(),
            authorization,
        })
    }

    fn formatter(&self) -> ResponseFormatter {
        let format = if self.verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };
        let mut formatter = ResponseFormatter::new(format);
        if self.no_body {
            formatter = formatter.hide_body();
        }
        if self.no_timing {
            formatter = formatter.hide_timing();
        }
        formatter
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::find_and_load();
    let history = Arc::new(HistoryStore::open(config.resolved_history_dir()));

    match cli.command {
        Commands::Send(args) => {
            let form = args.to_form()?;
            let client = Client::from_config(&config).context("failed to build HTTP client")?;
            let composer = RequestComposer::new(RequestExecutor::new(client, history));

            if let Some(response) = composer.submit(&form).await {
                println!("{}", args.formatter().format(&response));
            }
        }
        Commands::History { limit, clear } => {
            if clear {
                history.clear();
                println!("History cleared");
            } else {
                printer::list_history(&history.entries(), limit);
            }
        }
    }
    Ok(())
}
