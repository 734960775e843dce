// ==========================================
// 导入器集成测试
// ==========================================
// 测试目标: 验证文件导入的行级分桶、容错与幂等行为
// ==========================================


use std::sync::Arc;
use store_data_import::domain::types::DuplicatePolicy;
use store_data_import::importer::{CsvParser, JsonParser, ProductImporter};
use store_data_import::importer::importer_trait::Importer;
use store_data_import::logging;
use store_data_import::repository::{ProductRepository, ProductRepositoryImpl};
use test_helpers::{create_in_memory_conn, write_csv_file, write_json_file};

fn create_csv_importer(
    conn: Arc<std::sync::Mutex<rusqlite::Connection>>,
    policy: DuplicatePolicy,
) -> ProductImporter<ProductRepositoryImpl> {
    let repo = ProductRepositoryImpl::new(conn);
    ProductImporter::new(repo, Box::new(CsvParser), policy)
}

#[tokio::test]
async fn test_import_csv_partitions_rows() {
    logging::init_test();
    let conn = create_in_memory_conn();
    let importer = create_csv_importer(Arc::clone(&conn), DuplicatePolicy::Skip);

    // 第 2 行价格非法，其余两行正常
    let file = write_csv_file(&[
        "code,name,price_cents",
        "P001,白色马克杯,1990",
        "P002,保温壶,abc",
        "P003,玻璃水杯,990",
    ]);

    let result = importer.import(file.path()).await.unwrap();

    // 单行失败不中止整次导入
    assert_eq!(result.success_rows, vec!["P001", "P003"]);
    assert_eq!(result.failed_rows, vec!["P002"]);
    assert!(result.skipped_rows.is_empty());
    assert_eq!(result.total_rows(), 3);
    assert!(result.duration_ms >= 0);

    // 失败明细应能定位问题行
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].row_id, "P002");
    assert!(result.failures[0].reason.contains("价格"));

    // 落库验证
    let repo = ProductRepositoryImpl::new(conn);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_reimport_same_file_skips_existing() {
    logging::init_test();
    let conn = create_in_memory_conn();
    let importer = create_csv_importer(conn, DuplicatePolicy::Skip);

    let file = write_csv_file(&["code,name,price_cents", "P001,马克杯,1990"]);

    let first = importer.import(file.path()).await.unwrap();
    assert_eq!(first.success_rows, vec!["P001"]);

    // 重复导入同一文件: 全部落入 skipped 桶，不重复落库
    let second = importer.import(file.path()).await.unwrap();
    assert!(second.success_rows.is_empty());
    assert_eq!(second.skipped_rows, vec!["P001"]);
}

#[tokio::test]
async fn test_missing_code_falls_back_to_row_ordinal() {
    logging::init_test();
    let conn = create_in_memory_conn();
    let importer = create_csv_importer(conn, DuplicatePolicy::Skip);

    // 第 2 行缺少编码，应以数据行序号作为行标识
    let file = write_csv_file(&[
        "code,name,price_cents",
        "P001,马克杯,1990",
        ",无编码商品,100",
    ]);

    let result = importer.import(file.path()).await.unwrap();
    assert_eq!(result.failed_rows, vec!["2"]);
}

#[tokio::test]
async fn test_import_json_file() {
    logging::init_test();
    let conn = create_in_memory_conn();
    let repo = ProductRepositoryImpl::new(Arc::clone(&conn));
    let importer = ProductImporter::new(repo, Box::new(JsonParser), DuplicatePolicy::Skip);

    let file = write_json_file(
        r#"[{"code":"P001","name":"马克杯","price_cents":1990},
            {"code":"P002","name":"保温壶","price_cents":5990}]"#,
    );

    let result = importer.import(file.path()).await.unwrap();
    assert_eq!(result.success_rows, vec!["P001", "P002"]);

    let repo = ProductRepositoryImpl::new(conn);
    let loaded = repo.get("P002").await.unwrap().unwrap();
    assert_eq!(loaded.price_cents, 5990);
}

#[tokio::test]
async fn test_structural_error_aborts_run() {
    logging::init_test();
    let conn = create_in_memory_conn();
    let importer = create_csv_importer(conn, DuplicatePolicy::Skip);

    // 文件不存在属结构性错误，整次运行中止
    let result = importer
        .import(std::path::Path::new("definitely_missing.csv"))
        .await;
    assert!(result.is_err());
}
