// ==========================================
// 客户需求表同步服务 - 命令行入口
// ==========================================
// 用途: 批量/单客户同步的运维入口（对应每日定时任务）
// 来源: 本地文档库目录（<id>.xlsx / <id>.csv），远端网关由部署侧接入
//
// 用法:
//   sheet-sync <db_path> seed <did_number> <name> <sheet_url> [worksheet]
//   sheet-sync <db_path> sync <did_number> <sheets_dir> [--created]
//   sheet-sync <db_path> sync-all <sheets_dir>
// ==========================================

use action_sheet_sync::config::ConfigManager;
use action_sheet_sync::db::{init_schema, open_sqlite_connection};
use action_sheet_sync::domain::Customer;
use action_sheet_sync::repository::{CustomerRepository, CustomerRepositoryImpl};
use action_sheet_sync::sheet::FixtureSheetGateway;
use action_sheet_sync::sync::{SheetSyncService, SyncOptions};
use action_sheet_sync::logging;
use anyhow::{anyhow, bail, Context};
use std::sync::{Arc, Mutex};

fn print_usage() {
    eprintln!("用法:");
    eprintln!("  sheet-sync <db_path> seed <did_number> <name> <sheet_url> [worksheet]");
    eprintln!("  sheet-sync <db_path> sync <did_number> <sheets_dir> [--created]");
    eprintln!("  sheet-sync <db_path> sync-all <sheets_dir>");
}

fn build_service(
    conn: Arc<Mutex<rusqlite::Connection>>,
    sheets_dir: &str,
) -> anyhow::Result<(
    Arc<CustomerRepositoryImpl>,
    SheetSyncService<CustomerRepositoryImpl, ConfigManager>,
)> {
    let repo = Arc::new(CustomerRepositoryImpl::from_connection(conn.clone())?);
    let config = Arc::new(
        ConfigManager::from_connection(conn)
            .map_err(|e| anyhow!("配置管理器初始化失败: {}", e))?,
    );
    let gateway = Box::new(FixtureSheetGateway::new(sheets_dir));
    let service = SheetSyncService::new(repo.clone(), config, gateway);
    Ok((repo, service))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (db_path, command) = match (args.next(), args.next()) {
        (Some(db_path), Some(command)) => (db_path, command),
        _ => {
            print_usage();
            bail!("缺少参数");
        }
    };

    tracing::info!("{} v{}", action_sheet_sync::APP_NAME, action_sheet_sync::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path).context("打开数据库失败")?;
    init_schema(&conn).context("初始化 schema 失败")?;
    let conn = Arc::new(Mutex::new(conn));

    match command.as_str() {
        "seed" => {
            let (did_number, name, sheet_url) = match (args.next(), args.next(), args.next()) {
                (Some(did), Some(name), Some(url)) => (did, name, url),
                _ => {
                    print_usage();
                    bail!("seed 需要 <did_number> <name> <sheet_url>");
                }
            };
            let worksheet = args.next();

            let repo = CustomerRepositoryImpl::from_connection(conn)?;
            let mut customer = Customer::new(&did_number, &name, Some(&sheet_url));
            customer.worksheet_name = worksheet;
            repo.upsert_customer(&customer).await?;
            println!("客户已写入: {}", did_number);
        }
        "sync" => {
            let (did_number, sheets_dir) = match (args.next(), args.next()) {
                (Some(did), Some(dir)) => (did, dir),
                _ => {
                    print_usage();
                    bail!("sync 需要 <did_number> <sheets_dir>");
                }
            };
            let created = args.next().as_deref() == Some("--created");

            let (repo, service) = build_service(conn, &sheets_dir)?;
            let customer = repo
                .get_customer(&did_number)
                .await?
                .ok_or_else(|| anyhow!("客户不存在: {}", did_number))?;

            let report = service
                .sync_customer(&customer, SyncOptions { created })
                .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        "sync-all" => {
            let sheets_dir = match args.next() {
                Some(dir) => dir,
                None => {
                    print_usage();
                    bail!("sync-all 需要 <sheets_dir>");
                }
            };

            let (_repo, service) = build_service(conn, &sheets_dir)?;
            let summary = service
                .sync_all_customers()
                .await
                .map_err(|e| anyhow!("批量同步失败: {}", e))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        other => {
            print_usage();
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}
