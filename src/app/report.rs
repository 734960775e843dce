// ==========================================
// 商城数据导入系统 - 导入报告渲染
// ==========================================
// 职责: 把 ImportRunReport 渲染为终端可读文本
// 工具: rust-i18n（locales/ 下维护文案）
// ==========================================

use crate::api::ImportRunReport;
use rust_i18n::t;
use std::fmt::Write;

/// 渲染导入运行报告
///
/// # 参数
/// - report: 运行报告
/// - show_details: true 时附带逐条失败明细
pub fn render_report(report: &ImportRunReport, show_details: bool) -> String {
    let mut out = String::new();

    // 汇总行
    let _ = writeln!(
        out,
        "{}",
        t!(
            "report.header",
            importer = report.importer_name,
            source = report.source
        )
    );
    let _ = writeln!(
        out,
        "{}",
        t!(
            "report.summary",
            success = report.result.success_rows.len(),
            skipped = report.result.skipped_rows.len(),
            failed = report.result.failed_rows.len(),
            duration_ms = report.result.duration_ms
        )
    );

    // 失败明细
    if show_details && !report.result.failures.is_empty() {
        let _ = writeln!(out, "{}", t!("report.failure_header"));
        for failure in &report.result.failures {
            let _ = writeln!(
                out,
                "{}",
                t!(
                    "report.failure_line",
                    row_id = failure.row_id,
                    reason = failure.reason
                )
            );
        }
    }

    out
}

/// 渲染可用导入器列表（按数据种类分组）
pub fn render_importer_list(grouped: &[(String, Vec<String>)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", t!("report.importer_list_header"));
    for (kind, formats) in grouped {
        let _ = writeln!(out, "  {}: {}", kind, formats.join(", "));
    }
    out
}
