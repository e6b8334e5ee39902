use anyhow::Result;
use bazhuayu_client::{CacheConfig, Client, ClientConfig, Error};

/// 示例1：分页导出任务数据，每导出一批就标记为已导出
async fn example_export(client: &Client, task_id: &str) -> Result<()> {
    loop {
        let batch = client.export_data(task_id, Some(50)).await?;
        let rows = batch
            .get("data")
            .and_then(|data| data.get("dataList"))
            .and_then(|list| list.as_array())
            .map(|list| list.len())
            .unwrap_or(0);

        println!("本批导出 {} 条", rows);
        if rows == 0 {
            break;
        }

        client.update_data_status(task_id).await?;
    }

    Ok(())
}

/// 示例2：按偏移量遍历全部数据
async fn example_offset(client: &Client, task_id: &str) -> Result<()> {
    let mut offset = 0;

    loop {
        let page = client
            .get_data_of_task_by_offset(task_id, Some(offset), Some(100))
            .await?;
        let data = &page["data"];

        let rows = data["dataList"].as_array().map(|l| l.len()).unwrap_or(0);
        println!("偏移 {}: {} 条", offset, rows);

        match data["offset"].as_u64() {
            Some(next) if rows > 0 && next > offset => offset = next,
            _ => break,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = ClientConfig::new("your_username", "your_password").with_cache_config(
        CacheConfig::new("file")
            .param("directory", std::env::temp_dir().to_string_lossy().to_string())
            .param("namespace", "bazhuayu-demo"),
    );
    let client = Client::new(config)?;

    println!("=== 八爪鱼数据 API 使用示例 ===\n");

    match client.task_group().await {
        Ok(groups) => println!("任务组: {}", groups),
        Err(Error::Client { message, code }) => {
            println!("请求被拒绝 ({}): {}", code, message);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    println!("\n示例1: 导出未导出的数据");
    if let Err(e) = example_export(&client, "your_task_id").await {
        println!("错误: {}", e);
    }

    println!("\n示例2: 按偏移量读取数据");
    if let Err(e) = example_offset(&client, "your_task_id").await {
        println!("错误: {}", e);
    }

    Ok(())
}
