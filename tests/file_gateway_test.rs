// ==========================================
// 客户需求表同步服务 - 文件网关集成测试
// ==========================================
// 覆盖: CSV 文档库的拉取 / 缺失文档 / 端到端同步
// 说明: Excel 路径依赖二进制夹具，此处只覆盖 CSV；
//       工作表缺失的映射见 sync_orchestrator_test
// ==========================================


use action_sheet_sync::repository::{CustomerRepository, CustomerRepositoryImpl};
use action_sheet_sync::sheet::{FixtureSheetGateway, SheetError, SheetGateway, SourceRef};
use action_sheet_sync::sync::{SheetSyncService, SyncOptions, SyncStatus};
use std::io::Write;
use std::sync::Arc;
use test_helpers::{create_test_db, sample_customer, StaticConfigReader};

/// 在临时目录写入一个 CSV 文档
fn write_csv_fixture(dir: &std::path::Path, spreadsheet_id: &str, content: &str) {
    let path = dir.join(format!("{}.csv", spreadsheet_id));
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn source(spreadsheet_id: &str) -> SourceRef {
    SourceRef {
        spreadsheet_id: spreadsheet_id.to_string(),
        worksheet_name: "detail".to_string(),
    }
}

#[tokio::test]
async fn test_csv_fetch_rows_keeps_ragged_shape() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(
        dir.path(),
        "clinic-a",
        "诊所A,地址,备注1,,\n需求大类,需求,患者类型,处置动作,紧急提示\n内科,发热,成人,就诊,\n内科,发热\n",
    );

    let gateway = FixtureSheetGateway::new(dir.path());
    let rows = gateway.fetch_rows(&source("clinic-a")).await.unwrap();

    assert_eq!(rows.len(), 4);
    // 行尾空单元格被裁剪，行长度不齐
    assert_eq!(rows[0].len(), 3);
    assert_eq!(rows[2].len(), 4);
    assert_eq!(rows[3], vec!["内科".to_string(), "发热".to_string()]);
}

#[tokio::test]
async fn test_csv_fetch_title_is_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(dir.path(), "clinic-2", "a,b,c\n");

    let gateway = FixtureSheetGateway::new(dir.path());
    let title = gateway.fetch_title(&source("clinic-2")).await.unwrap();

    assert_eq!(title, "clinic-2");
}

#[tokio::test]
async fn test_missing_fixture_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FixtureSheetGateway::new(dir.path());

    let err = gateway.fetch_rows(&source("ghost")).await.unwrap_err();
    assert!(matches!(err, SheetError::NotFound(_)));

    let err = gateway.fetch_title(&source("ghost")).await.unwrap_err();
    assert!(matches!(err, SheetError::NotFound(_)));
}

#[tokio::test]
async fn test_end_to_end_sync_from_csv_fixture() {
    let dir = tempfile::tempdir().unwrap();
    // 文件主名带 "-2" 重名后缀: 同步后缓存标题应剥离为 "clinic"
    write_csv_fixture(
        dir.path(),
        "clinic-2",
        "诊所A总机,某市某路 1 号,夜间转接,,\n需求大类,需求,患者类型,处置动作,紧急提示\nA,D1,P1,act1,\nA,D1,P1,act2,urgent\nA,D2,P2,,\n",
    );

    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = Arc::new(CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败"));

    let customer = sample_customer("D500", "clinic-2");
    repo.upsert_customer(&customer).await.unwrap();

    let service = SheetSyncService::new(
        repo.clone(),
        Arc::new(StaticConfigReader::default()),
        Box::new(FixtureSheetGateway::new(dir.path())),
    );
    let report = service
        .sync_customer(&customer, SyncOptions { created: true })
        .await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(report.records_added, 3);
    assert_eq!(report.spreadsheet_title.as_deref(), Some("clinic"));

    let tree = repo.load_hierarchy("D500").await.unwrap();
    assert_eq!(tree.node_counts(), (1, 2, 2, 3));

    let stored = repo.get_customer("D500").await.unwrap().unwrap();
    assert_eq!(stored.name, "诊所A总机");
    assert_eq!(stored.filetitle.as_deref(), Some("clinic"));
}
