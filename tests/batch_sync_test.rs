// ==========================================
// 客户需求表同步服务 - 批量同步集成测试
// ==========================================
// 覆盖: 全量客户批量同步 / 单客户失败不中止整批
// ==========================================


use action_sheet_sync::repository::{CustomerRepository, CustomerRepositoryImpl};
use action_sheet_sync::sync::{BatchSummary, SheetSyncService};
use std::sync::Arc;
use test_helpers::{create_test_db, grid, sample_customer, MappedSheetGateway, StaticConfigReader};

fn data_grid(title_label: &str) -> Vec<Vec<String>> {
    grid(&[
        &["诊所", "", "", "", ""],
        &["需求大类", "需求", "患者类型", "处置动作", "紧急提示"],
        &[title_label, "D", "P", "act", ""],
    ])
}

#[tokio::test]
async fn test_batch_sync_counts_success_and_failure() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = Arc::new(CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败"));

    // 三个客户: 两个文档可用，一个文档缺失
    for (did, sheet_id) in [("D400", "sheet-a"), ("D401", "sheet-b"), ("D402", "sheet-missing")] {
        repo.upsert_customer(&sample_customer(did, sheet_id))
            .await
            .unwrap();
    }

    let gateway = MappedSheetGateway::new()
        .with_sheet("sheet-a", "表A", data_grid("甲"))
        .with_sheet("sheet-b", "表B", data_grid("乙"));

    let service = SheetSyncService::new(
        repo.clone(),
        Arc::new(StaticConfigReader::default()),
        Box::new(gateway),
    );
    let summary = service.sync_all_customers().await.unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            total: 3,
            updated: 2,
            failed: 1,
        }
    );

    // 成功客户的层级已写入；失败客户保持为空
    assert_eq!(repo.load_hierarchy("D400").await.unwrap().node_counts(), (1, 1, 1, 1));
    assert_eq!(repo.load_hierarchy("D401").await.unwrap().node_counts(), (1, 1, 1, 1));
    assert!(repo.load_hierarchy("D402").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_sync_with_no_customers() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = Arc::new(CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败"));

    let service = SheetSyncService::new(
        repo.clone(),
        Arc::new(StaticConfigReader::default()),
        Box::new(MappedSheetGateway::new()),
    );
    let summary = service.sync_all_customers().await.unwrap();

    assert_eq!(summary, BatchSummary::default());
}

#[tokio::test]
async fn test_batch_sync_serial_when_concurrency_is_one() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = Arc::new(CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败"));

    for (did, sheet_id) in [("D403", "sheet-a"), ("D404", "sheet-b")] {
        repo.upsert_customer(&sample_customer(did, sheet_id))
            .await
            .unwrap();
    }

    let gateway = MappedSheetGateway::new()
        .with_sheet("sheet-a", "表A", data_grid("甲"))
        .with_sheet("sheet-b", "表B", data_grid("乙"));
    let config = StaticConfigReader {
        batch_concurrency: 1,
        ..StaticConfigReader::default()
    };

    let service = SheetSyncService::new(repo.clone(), Arc::new(config), Box::new(gateway));
    let summary = service.sync_all_customers().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.failed, 0);
}
