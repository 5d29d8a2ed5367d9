// ==========================================
// 挤出线车间管理系统 - 报表导出引擎
// ==========================================
// 职责: 选中订单 → CSV 字节 / 分页 PDF 字节
// 红线: 纯函数，不落盘（写文件由 API 层负责）
// ==========================================
// CSV: UTF-8 BOM + CRLF，字段含逗号/引号/换行时加引号，内部引号双写
// PDF: A4 纵向，标题 + 表格，每页重复表头
// ==========================================

use crate::domain::production::ProductionOrder;
use chrono::NaiveDateTime;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use thiserror::Error;

/// UTF-8 BOM（Excel 识别编码用）
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 缺失时间的占位符
pub const MISSING_TIME: &str = "N/A";

pub const CSV_HEADERS: [&str; 10] = [
    "ID",
    "OP",
    "Produto",
    "Lote",
    "Status",
    "Planejado (kg)",
    "Real (kg)",
    "Operador",
    "Início",
    "Fim",
];

pub const PDF_TITLE: &str = "Relatório de Produção - PCP";

pub const PDF_HEADERS: [&str; 7] = [
    "OP",
    "Produto",
    "Lote",
    "Status",
    "Planejado (kg)",
    "Real (kg)",
    "Operador",
];

// A4 版面（毫米）
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT_MM: f32 = 14.0;
const TITLE_Y_MM: f32 = PAGE_HEIGHT_MM - 15.0;
const TABLE_TOP_MM: f32 = PAGE_HEIGHT_MM - 24.0;
const ROW_HEIGHT_MM: f32 = 7.0;
const TITLE_FONT_SIZE: f32 = 14.0;
const CELL_FONT_SIZE: f32 = 9.0;
const FOOTER_Y_MM: f32 = 10.0;

// 列宽合计 = 182mm（左右各 14mm 边距）
const COLUMN_WIDTHS_MM: [f32; 7] = [24.0, 36.0, 22.0, 22.0, 28.0, 22.0, 28.0];

// ==========================================
// ExportError - 导出错误
// ==========================================
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(String),

    #[error("PDF 生成失败: {0}")]
    Pdf(String),

    #[error("文件写入失败: {0}")]
    Io(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

// ==========================================
// CSV
// ==========================================

/// 渲染 CSV（BOM + 表头 + 每订单一行）
pub fn render_csv(orders: &[ProductionOrder], timestamp_format: &str) -> ExportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(CSV_HEADERS)?;
    for order in orders {
        writer.write_record(csv_row(order, timestamp_format))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

/// 单行 CSV 字段
pub fn csv_row(order: &ProductionOrder, timestamp_format: &str) -> [String; 10] {
    [
        order.id.map(|id| id.to_string()).unwrap_or_default(),
        order.op.clone(),
        order.product.clone(),
        order.lot.clone(),
        order.status.label().to_string(),
        order.planned_kg.to_string(),
        order.actual_kg.to_string(),
        order.operator.clone(),
        format_time(order.start_time, timestamp_format),
        format_time(order.end_time, timestamp_format),
    ]
}

fn format_time(t: Option<NaiveDateTime>, timestamp_format: &str) -> String {
    match t {
        Some(t) => t.format(timestamp_format).to_string(),
        None => MISSING_TIME.to_string(),
    }
}

// ==========================================
// PDF
// ==========================================

/// 按每页行数切分（至少 1 行/页）
pub fn paginate<T>(rows: &[T], rows_per_page: usize) -> Vec<&[T]> {
    if rows.is_empty() {
        return Vec::new();
    }
    rows.chunks(rows_per_page.max(1)).collect()
}

/// 单行 PDF 单元格
pub fn pdf_row(order: &ProductionOrder) -> [String; 7] {
    [
        order.op.clone(),
        order.product.clone(),
        order.lot.clone(),
        order.status.label().to_string(),
        order.planned_kg.to_string(),
        order.actual_kg.to_string(),
        order.operator.clone(),
    ]
}

/// 渲染分页 PDF
///
/// 调用方保证 orders 非空（空选择在 API 层拦截）
pub fn render_pdf(orders: &[ProductionOrder], rows_per_page: usize) -> ExportResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        PDF_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let rows: Vec<[String; 7]> = orders.iter().map(pdf_row).collect();
    let pages = paginate(&rows, rows_per_page);
    let page_count = pages.len().max(1);

    for (page_no, chunk) in pages.iter().enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", page_no + 1),
            );
            doc.get_page(page).get_layer(layer)
        };

        if page_no == 0 {
            layer.use_text(PDF_TITLE, TITLE_FONT_SIZE, Mm(MARGIN_LEFT_MM), Mm(TITLE_Y_MM), &bold);
        }
        draw_table_page(&layer, chunk, &font, &bold);
        layer.use_text(
            format!("{}/{}", page_no + 1, page_count),
            CELL_FONT_SIZE,
            Mm(PAGE_WIDTH_MM - MARGIN_LEFT_MM - 10.0),
            Mm(FOOTER_Y_MM),
            &font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn draw_table_page(
    layer: &PdfLayerReference,
    rows: &[[String; 7]],
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let header: Vec<String> = PDF_HEADERS.iter().map(|h| h.to_string()).collect();
    draw_row(layer, &header, TABLE_TOP_MM, bold);

    let rule_y = TABLE_TOP_MM - 2.0;
    let table_width: f32 = COLUMN_WIDTHS_MM.iter().sum();
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT_MM), Mm(rule_y)), false),
            (Point::new(Mm(MARGIN_LEFT_MM + table_width), Mm(rule_y)), false),
        ],
        is_closed: false,
    });

    for (i, row) in rows.iter().enumerate() {
        let y = TABLE_TOP_MM - ROW_HEIGHT_MM * (i as f32 + 1.0);
        draw_row(layer, row, y, font);
    }
}

fn draw_row(layer: &PdfLayerReference, cells: &[String], y: f32, font: &IndirectFontRef) {
    let mut x = MARGIN_LEFT_MM;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS_MM.iter()) {
        layer.use_text(fit_cell(cell, *width), CELL_FONT_SIZE, Mm(x), Mm(y), font);
        x += width;
    }
}

/// 按列宽截断（9pt Helvetica 约 1.8mm/字符）
fn fit_cell(text: &str, width_mm: f32) -> String {
    let max_chars = ((width_mm - 1.0) / 1.8).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderStatus;
    use chrono::NaiveDate;

    const FMT: &str = "%d/%m/%Y %H:%M:%S";

    fn order(id: i64, product: &str) -> ProductionOrder {
        ProductionOrder {
            id: Some(id),
            op: format!("OP-{}", id),
            product: product.to_string(),
            lot: "L-7".to_string(),
            planned_kg: 100.0,
            actual_kg: 90.5,
            operator: "Ana".to_string(),
            notes: String::new(),
            status: OrderStatus::Completed,
            start_time: Some(
                NaiveDate::from_ymd_opt(2026, 7, 1)
                    .unwrap()
                    .and_hms_opt(6, 5, 0)
                    .unwrap(),
            ),
            end_time: None,
        }
    }

    #[test]
    fn test_csv_layout() {
        let bytes = render_csv(&[order(1, "Filme")], FMT).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "ID,OP,Produto,Lote,Status,Planejado (kg),Real (kg),Operador,Início,Fim"
        );
        assert_eq!(
            lines[1],
            "1,OP-1,Filme,L-7,Concluída,100,90.5,Ana,01/07/2026 06:05:00,N/A"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_csv_quoting_reads_back() {
        let bytes = render_csv(&[order(2, "Resin, \"Type A\"")], FMT).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("\"Resin, \"\"Type A\"\"\""));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[2], "Resin, \"Type A\"");
    }

    #[test]
    fn test_paginate() {
        let rows: Vec<i32> = (0..65).collect();
        let pages = paginate(&rows, 30);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].len(), 5);
        assert!(paginate::<i32>(&[], 30).is_empty());
        assert_eq!(paginate(&rows, 0).len(), 65);
    }

    #[test]
    fn test_render_pdf_bytes() {
        let orders: Vec<_> = (1..=40).map(|i| order(i, "Tubo PEAD")).collect();
        let bytes = render_pdf(&orders, 30).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_fit_cell() {
        assert_eq!(fit_cell("OP-1", 24.0), "OP-1");
        let cut = fit_cell("Polietileno de alta densidade", 22.0);
        assert!(cut.ends_with('…'));
        assert!(cut.chars().count() <= 12);
    }
}
