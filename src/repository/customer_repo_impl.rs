// ==========================================
// 客户需求表同步服务 - 客户仓储实现
// ==========================================
// 存储: SQLite（rusqlite, Arc<Mutex<Connection>>）
// 事务: replace_hierarchy 使用 IMMEDIATE 事务，出错时 Drop 自动回滚
// 并发: 进程内 HashSet 登记占用，同一客户的同步快速失败
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::customer::{Customer, HeaderUpdate};
use crate::domain::hierarchy::{ActionLeaf, HierarchyTree};
use crate::repository::customer_repo::{CustomerRepository, SyncGuard};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// CustomerRepositoryImpl
// ==========================================
pub struct CustomerRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
    active_syncs: Arc<Mutex<HashSet<String>>>,
}

impl CustomerRepositoryImpl {
    /// 创建新的 Repository 实例（自动引导 schema）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            active_syncs: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// 从已有连接创建 Repository
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self {
            conn,
            active_syncs: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    fn lock_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_customer_row(row: &Row) -> rusqlite::Result<Customer> {
        Ok(Customer {
            did_number: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            note1: row.get(3)?,
            note2: row.get(4)?,
            note3: row.get(5)?,
            sheet_url: row.get(6)?,
            worksheet_name: row.get(7)?,
            filetitle: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    const CUSTOMER_COLUMNS: &'static str = "did_number, name, address, note1, note2, note3, \
         sheet_url, worksheet_name, filetitle, created_at, updated_at";

    /// 在事务中按树序写入整个层级子树
    fn insert_tree_tx(
        tx: &Transaction,
        did_number: &str,
        tree: &HierarchyTree,
    ) -> RepositoryResult<()> {
        let mut insert_title = tx.prepare(
            "INSERT INTO demand_title (customer_id, title, position) VALUES (?1, ?2, ?3)",
        )?;
        let mut insert_demand =
            tx.prepare("INSERT INTO demand (demand_title_id, name, position) VALUES (?1, ?2, ?3)")?;
        let mut insert_patient_type =
            tx.prepare("INSERT INTO patient_type (demand_id, name, position) VALUES (?1, ?2, ?3)")?;
        let mut insert_action = tx.prepare(
            "INSERT INTO action (patient_type_id, description, dire_text, position) \
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (title_pos, title) in tree.titles.iter().enumerate() {
            insert_title.execute(params![did_number, title.label, title_pos as i64])?;
            let title_id = tx.last_insert_rowid();

            for (demand_pos, demand) in title.demands.iter().enumerate() {
                insert_demand.execute(params![title_id, demand.label, demand_pos as i64])?;
                let demand_id = tx.last_insert_rowid();

                for (pt_pos, patient_type) in demand.patient_types.iter().enumerate() {
                    insert_patient_type.execute(params![
                        demand_id,
                        patient_type.label,
                        pt_pos as i64
                    ])?;
                    let patient_type_id = tx.last_insert_rowid();

                    for (action_pos, action) in patient_type.actions.iter().enumerate() {
                        insert_action.execute(params![
                            patient_type_id,
                            action.description,
                            action.dire_text,
                            action_pos as i64
                        ])?;
                    }
                }
            }
        }

        Ok(())
    }

    /// 在事务中覆写表头字段（None 字段保持原值）
    fn update_header_tx(
        tx: &Transaction,
        did_number: &str,
        header: &HeaderUpdate,
    ) -> RepositoryResult<()> {
        let mut apply = |sql: &str, value: &Option<String>| -> RepositoryResult<()> {
            if let Some(v) = value {
                tx.execute(sql, params![v, did_number])?;
            }
            Ok(())
        };

        apply("UPDATE customer SET name = ?1 WHERE did_number = ?2", &header.name)?;
        apply(
            "UPDATE customer SET address = ?1 WHERE did_number = ?2",
            &header.address,
        )?;
        apply("UPDATE customer SET note1 = ?1 WHERE did_number = ?2", &header.note1)?;
        apply("UPDATE customer SET note2 = ?1 WHERE did_number = ?2", &header.note2)?;
        apply("UPDATE customer SET note3 = ?1 WHERE did_number = ?2", &header.note3)?;
        apply(
            "UPDATE customer SET filetitle = ?1 WHERE did_number = ?2",
            &header.filetitle,
        )?;

        tx.execute(
            "UPDATE customer SET updated_at = ?1 WHERE did_number = ?2",
            params![Utc::now(), did_number],
        )?;
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for CustomerRepositoryImpl {
    async fn get_customer(&self, did_number: &str) -> RepositoryResult<Option<Customer>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM customer WHERE did_number = ?1",
            Self::CUSTOMER_COLUMNS
        );
        let customer = conn
            .query_row(&sql, params![did_number], Self::map_customer_row)
            .optional()?;
        Ok(customer)
    }

    async fn upsert_customer(&self, customer: &Customer) -> RepositoryResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO customer (
                did_number, name, address, note1, note2, note3,
                sheet_url, worksheet_name, filetitle, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(did_number) DO UPDATE SET
                name = excluded.name,
                sheet_url = excluded.sheet_url,
                worksheet_name = excluded.worksheet_name,
                updated_at = excluded.updated_at
            "#,
            params![
                customer.did_number,
                customer.name,
                customer.address,
                customer.note1,
                customer.note2,
                customer.note3,
                customer.sheet_url,
                customer.worksheet_name,
                customer.filetitle,
                customer.created_at,
                customer.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn list_customers(&self) -> RepositoryResult<Vec<Customer>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM customer ORDER BY did_number",
            Self::CUSTOMER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let customers = stmt
            .query_map([], Self::map_customer_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    async fn begin_sync(&self, did_number: &str) -> RepositoryResult<SyncGuard> {
        SyncGuard::acquire(self.active_syncs.clone(), did_number)
    }

    async fn replace_hierarchy(
        &self,
        did_number: &str,
        tree: &HierarchyTree,
        header: &HeaderUpdate,
    ) -> RepositoryResult<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 客户必须已存在：层级子树没有独立于客户的生命周期
        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM customer WHERE did_number = ?1",
                params![did_number],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "Customer".to_string(),
                id: did_number.to_string(),
            });
        }

        // 删除旧层级（级联到四级），再按树序重建；失败时 tx Drop 回滚
        tx.execute(
            "DELETE FROM demand_title WHERE customer_id = ?1",
            params![did_number],
        )?;
        Self::insert_tree_tx(&tx, did_number, tree)?;
        Self::update_header_tx(&tx, did_number, header)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    async fn load_hierarchy(&self, did_number: &str) -> RepositoryResult<HierarchyTree> {
        let conn = self.lock_conn()?;
        let mut tree = HierarchyTree::new();

        let mut title_stmt = conn.prepare(
            "SELECT id, title FROM demand_title WHERE customer_id = ?1 ORDER BY position",
        )?;
        let mut demand_stmt =
            conn.prepare("SELECT id, name FROM demand WHERE demand_title_id = ?1 ORDER BY position")?;
        let mut patient_type_stmt =
            conn.prepare("SELECT id, name FROM patient_type WHERE demand_id = ?1 ORDER BY position")?;
        let mut action_stmt = conn.prepare(
            "SELECT description, dire_text FROM action WHERE patient_type_id = ?1 ORDER BY position",
        )?;

        let titles: Vec<(i64, String)> = title_stmt
            .query_map(params![did_number], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for (title_id, title_label) in titles {
            let title = tree.entry_title(&title_label);

            let demands: Vec<(i64, String)> = demand_stmt
                .query_map(params![title_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            for (demand_id, demand_label) in demands {
                let demand = title.entry_demand(&demand_label);

                let patient_types: Vec<(i64, String)> = patient_type_stmt
                    .query_map(params![demand_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;

                for (patient_type_id, patient_type_label) in patient_types {
                    let patient_type = demand.entry_patient_type(&patient_type_label);

                    let actions: Vec<ActionLeaf> = action_stmt
                        .query_map(params![patient_type_id], |row| {
                            Ok(ActionLeaf {
                                description: row.get(0)?,
                                dire_text: row.get(1)?,
                            })
                        })?
                        .collect::<Result<Vec<_>, _>>()?;

                    for action in actions {
                        patient_type.push_action(action);
                    }
                }
            }
        }

        Ok(tree)
    }
}
