// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试范围:
// 1. CSV 文件格式（BOM / CRLF / 引号转义 / 时间格式）
// 2. 空选择（CSV 不建文件，PDF 返回提示错误）
// 3. PDF 分页输出
// 4. 配置覆盖文件名
// ==========================================

mod helpers;

use std::fs;

use helpers::api_test_helper::*;
use helpers::test_data_builder::OrderBuilder;

use extrusion_erp::api::ApiError;
use extrusion_erp::config::config_keys;
use extrusion_erp::engine::report_export::UTF8_BOM;

#[test]
fn test_export_csv_format() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let a = env.create_order_id(
        &OrderBuilder::new("OP-1")
            .product("Resin, \"Type A\"")
            .planned(100.0)
            .build(),
    );
    let b = env.create_order_id(&OrderBuilder::new("OP-2").operator("Bia").build());
    env.production_api
        .activate_order(&env.control(), a, at(12, 6, 5))
        .unwrap();

    let path = env
        .report_api
        .export_csv(&env.control(), &[a, b], env.export_dir.path())
        .expect("导出失败")
        .expect("应写入文件");
    assert_eq!(path.file_name().unwrap(), "relatorio_pcp.csv");

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.split("\r\n").collect();

    assert_eq!(
        lines[0],
        "ID,OP,Produto,Lote,Status,Planejado (kg),Real (kg),Operador,Início,Fim"
    );
    assert!(lines[1].contains(r#""Resin, ""Type A""""#));
    assert!(lines[1].contains("12/09/2026 06:05:00"));
    assert!(lines[1].ends_with(",N/A"));
    assert!(lines[2].ends_with("N/A,N/A"));
    assert_eq!(lines[3], "");
    assert_eq!(lines.len(), 4);

    // 读回字段一致
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let first = reader.records().next().unwrap().unwrap();
    assert_eq!(&first[2], "Resin, \"Type A\"");
}

#[test]
fn test_export_csv_empty_selection_creates_no_file() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let written = env
        .report_api
        .export_csv(&env.control(), &[], env.export_dir.path())
        .expect("空选择不应报错");
    assert_eq!(written, None);

    // 不存在的ID同样视为空选择
    let written = env
        .report_api
        .export_csv(&env.control(), &[42], env.export_dir.path())
        .unwrap();
    assert_eq!(written, None);
    assert_eq!(fs::read_dir(env.export_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_export_pdf_paginated() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.config
        .set_config_value(config_keys::PDF_ROWS_PER_PAGE, "4")
        .unwrap();
    let ids: Vec<i64> = (0..10)
        .map(|i| env.create_order_id(&OrderBuilder::new(&format!("OP-{:02}", i)).build()))
        .collect();

    let path = env
        .report_api
        .export_pdf(&env.control(), &ids, env.export_dir.path())
        .expect("导出失败");
    assert_eq!(path.file_name().unwrap(), "relatorio_pcp.pdf");

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[test]
fn test_export_pdf_empty_selection_warns() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let err = env
        .report_api
        .export_pdf(&env.control(), &[], env.export_dir.path())
        .unwrap_err();

    assert!(matches!(err, ApiError::EmptySelection(_)));
    assert!(err.is_user_correctable());
    assert!(!err.to_string().is_empty());
    assert_eq!(fs::read_dir(env.export_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_export_file_name_from_config() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.config
        .set_config_value(config_keys::EXPORT_CSV_FILE_NAME, "turno_a.csv")
        .unwrap();
    env.config
        .set_config_value(config_keys::EXPORT_TIMESTAMP_FORMAT, "%Y-%m-%d")
        .unwrap();
    let id = env.create_order_id(&OrderBuilder::new("OP-1").build());
    env.production_api
        .activate_order(&env.control(), id, at(12, 6, 0))
        .unwrap();

    let path = env
        .report_api
        .export_csv(&env.control(), &[id], env.export_dir.path())
        .unwrap()
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "turno_a.csv");
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("2026-09-12"));
}

#[test]
fn test_pcp_rows_and_permissions() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let id = env.create_order_id(&OrderBuilder::new("OP-1").planned(100.0).build());
    env.create_order_id(&OrderBuilder::new("OP-0").planned(0.0).build());
    env.production_api
        .activate_order(&env.control(), id, at(12, 6, 0))
        .unwrap();
    env.production_api
        .log_production(&env.operator(), 90.0, at(12, 7, 0))
        .unwrap();

    let rows = env.report_api.pcp_rows(&env.control()).unwrap();
    assert_eq!(rows.len(), 2);
    // ID 升序，与导出顺序一致
    assert_eq!(rows[0].order.op, "OP-1");
    assert!((rows[0].deviation_percent + 10.0).abs() < 1e-9);
    assert_eq!(rows[1].order.op, "OP-0");
    assert_eq!(rows[1].deviation_percent, 0.0);

    assert!(env.report_api.pcp_rows(&env.operator()).is_err());
    assert!(env
        .report_api
        .export_pdf(&env.operator(), &[id], env.export_dir.path())
        .is_err());
}
