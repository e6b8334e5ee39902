use anyhow::{Result, anyhow};
use bazhuayu_client::{CacheConfig, Client, ClientConfig};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "八爪鱼数据 API 命令行工具", long_about = None)]
struct Args {
    #[arg(short, long, help = "JSON 配置文件，未指定时读取环境变量")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "账号，覆盖配置")]
    username: Option<String>,

    #[arg(short, long, help = "密码，覆盖配置")]
    password: Option<String>,

    #[arg(long, help = "令牌缓存目录")]
    cache_dir: Option<PathBuf>,

    #[arg(long, help = "API 根地址")]
    base_uri: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 获取访问令牌
    Token {
        #[arg(short, long, help = "强制刷新")]
        refresh: bool,
    },
    /// 列出所有任务组
    TaskGroups,
    /// 列出任务组中的任务
    Tasks { task_group_id: String },
    /// 导出一批未导出的数据
    Export {
        task_id: String,
        #[arg(short, long)]
        size: Option<u32>,
    },
    /// 标记数据为已导出
    MarkExported { task_id: String },
    /// 清空任务数据
    RemoveData { task_id: String },
    /// 按偏移量获取任务数据
    DataByOffset {
        task_id: String,
        #[arg(short, long)]
        offset: Option<u64>,
        #[arg(short, long)]
        size: Option<u32>,
    },
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match (&args.config, &args.username, &args.password) {
        (Some(path), _, _) => ClientConfig::from_file(path)?,
        (None, Some(username), Some(password)) => ClientConfig::new(username, password),
        _ => ClientConfig::from_env()?,
    };

    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_config(
            CacheConfig::new("file").param("directory", dir.to_string_lossy().to_string()),
        );
    }
    if let Some(base_uri) = &args.base_uri {
        config.base_uri = base_uri.clone();
    }

    if config.username.is_empty() || config.password.is_empty() {
        return Err(anyhow!("账号和密码不能为空"));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!("使用账号 {} 连接 {}", config.username, config.base_uri);

    let client = Client::new(config)?;

    let body = match args.command {
        Command::Token { refresh } => serde_json::to_value(client.token(refresh).await?)?,
        Command::TaskGroups => client.task_group().await?,
        Command::Tasks { task_group_id } => client.task(&task_group_id).await?,
        Command::Export { task_id, size } => client.export_data(&task_id, size).await?,
        Command::MarkExported { task_id } => client.update_data_status(&task_id).await?,
        Command::RemoveData { task_id } => client.remove_data_by_task_id(&task_id).await?,
        Command::DataByOffset {
            task_id,
            offset,
            size,
        } => {
            client
                .get_data_of_task_by_offset(&task_id, offset, size)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
