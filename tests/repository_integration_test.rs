// ==========================================
// 客户需求表同步服务 - 仓储层集成测试
// ==========================================
// 覆盖: 层级写读往返 / 事务回滚原子性 / upsert 字段语义
// ==========================================


use action_sheet_sync::domain::{ActionLeaf, Customer, HeaderUpdate, HierarchyTree};
use action_sheet_sync::repository::{CustomerRepository, CustomerRepositoryImpl, RepositoryError};
use test_helpers::create_test_db;

fn sample_tree() -> HierarchyTree {
    let mut tree = HierarchyTree::new();
    tree.entry_title("内科")
        .entry_demand("发热")
        .entry_patient_type("成人")
        .push_action(ActionLeaf {
            description: "建议就诊".to_string(),
            dire_text: String::new(),
        });
    tree.entry_title("内科")
        .entry_demand("发热")
        .entry_patient_type("儿童")
        .push_action(ActionLeaf {
            description: "转接值班医生".to_string(),
            dire_text: "急".to_string(),
        });
    tree.entry_title("外科")
        .entry_demand("外伤")
        .entry_patient_type("成人")
        .push_action(ActionLeaf::default());
    tree
}

#[tokio::test]
async fn test_replace_and_load_round_trip_preserves_order() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    let customer = Customer::new("D100", "诊所", None);
    repo.upsert_customer(&customer).await.unwrap();

    let tree = sample_tree();
    repo.replace_hierarchy("D100", &tree, &HeaderUpdate::default())
        .await
        .unwrap();

    let loaded = repo.load_hierarchy("D100").await.unwrap();
    assert_eq!(loaded, tree);
    assert_eq!(loaded.node_counts(), (2, 2, 3, 3));
}

#[tokio::test]
async fn test_replace_overwrites_previous_tree_completely() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    let customer = Customer::new("D101", "诊所", None);
    repo.upsert_customer(&customer).await.unwrap();

    repo.replace_hierarchy("D101", &sample_tree(), &HeaderUpdate::default())
        .await
        .unwrap();

    // 第二次替换为单节点树: 前一棵树的节点全部消失
    let mut small = HierarchyTree::new();
    small
        .entry_title("仅存")
        .entry_demand("需求")
        .entry_patient_type("类型")
        .push_action(ActionLeaf::default());
    repo.replace_hierarchy("D101", &small, &HeaderUpdate::default())
        .await
        .unwrap();

    let loaded = repo.load_hierarchy("D101").await.unwrap();
    assert_eq!(loaded, small);
    assert_eq!(loaded.node_counts(), (1, 1, 1, 1));
}

#[tokio::test]
async fn test_failed_replace_rolls_back_to_previous_tree() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    let customer = Customer::new("D102", "诊所", None);
    repo.upsert_customer(&customer).await.unwrap();

    let before = sample_tree();
    repo.replace_hierarchy("D102", &before, &HeaderUpdate::default())
        .await
        .unwrap();

    // 注入非法树: 空标签违反存储层 CHECK 约束，插入发生在删除旧树之后
    let mut poisoned = HierarchyTree::new();
    poisoned
        .entry_title("合法大类")
        .entry_demand("合法需求")
        .entry_patient_type("合法类型")
        .push_action(ActionLeaf::default());
    poisoned.entry_title(""); // 将触发 CHECK (title <> '')

    let header = HeaderUpdate {
        filetitle: Some("不应落库的标题".to_string()),
        ..HeaderUpdate::default()
    };
    let result = repo.replace_hierarchy("D102", &poisoned, &header).await;
    assert!(result.is_err());

    // 回滚语义: 失败后观察到的层级与同步前完全一致，而不是空树/半成品
    let after = repo.load_hierarchy("D102").await.unwrap();
    assert_eq!(after, before);

    // 同事务内的表头更新同样未生效
    let stored = repo.get_customer("D102").await.unwrap().unwrap();
    assert!(stored.filetitle.is_none());
}

#[tokio::test]
async fn test_replace_for_unknown_customer_fails() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    let result = repo
        .replace_hierarchy("不存在", &HierarchyTree::new(), &HeaderUpdate::default())
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[tokio::test]
async fn test_upsert_updates_identity_fields_only() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    let customer = Customer::new("D103", "旧名", Some("https://sheets.local/d/a/edit"));
    repo.upsert_customer(&customer).await.unwrap();

    // 同步事务写入表头来源字段
    let header = HeaderUpdate {
        address: Some("地址".to_string()),
        note1: Some("备注".to_string()),
        filetitle: Some("标题".to_string()),
        ..HeaderUpdate::default()
    };
    repo.replace_hierarchy("D103", &HierarchyTree::new(), &header)
        .await
        .unwrap();

    // 再次 upsert（外部编辑 name/URL）: 表头来源字段不被覆盖
    let mut edited = Customer::new("D103", "新名", Some("https://sheets.local/d/b/edit"));
    edited.worksheet_name = Some("主表".to_string());
    repo.upsert_customer(&edited).await.unwrap();

    let stored = repo.get_customer("D103").await.unwrap().unwrap();
    assert_eq!(stored.name, "新名");
    assert_eq!(stored.sheet_url.as_deref(), Some("https://sheets.local/d/b/edit"));
    assert_eq!(stored.worksheet_name.as_deref(), Some("主表"));
    assert_eq!(stored.address.as_deref(), Some("地址"));
    assert_eq!(stored.note1.as_deref(), Some("备注"));
    assert_eq!(stored.filetitle.as_deref(), Some("标题"));
}

#[tokio::test]
async fn test_list_customers_ordered_by_did() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = CustomerRepositoryImpl::new(&db_path).expect("创建Repository失败");

    for did in ["D202", "D200", "D201"] {
        repo.upsert_customer(&Customer::new(did, "诊所", None))
            .await
            .unwrap();
    }

    let customers = repo.list_customers().await.unwrap();
    let dids: Vec<&str> = customers.iter().map(|c| c.did_number.as_str()).collect();
    assert_eq!(dids, vec!["D200", "D201", "D202"]);
}
