use crate::app::App;
use emr_client::ClientResult;
use emr_core::dashboard::DashboardStats;
use std::fmt::Write;

pub const DEFAULT_MONTHS: u32 = 6;
const BAR_WIDTH: usize = 30;

pub async fn show(app: &App, months: u32) -> ClientResult<String> {
    let patients = app.client.patients().all(None).await?;
    let stats = DashboardStats::compute(&patients, app.today(), app.offset(), months.max(1));
    Ok(render_dashboard(&stats))
}

pub fn render_dashboard(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tổng số bệnh nhân: {}", stats.total_patients);
    let _ = writeln!(out, "Mới trong tháng:   {}", stats.new_this_month);
    let _ = writeln!(out, "Có tiền sử dị ứng: {}", stats.with_allergies);
    let _ = writeln!(
        out,
        "Tuổi trung bình:   {}",
        stats
            .average_age
            .map_or_else(|| "-".to_string(), |age| format!("{age:.1}"))
    );

    out.push_str("\nGiới tính\n");
    for (gender, count) in stats.by_gender.iter().filter(|(_, c)| *c > 0) {
        let _ = writeln!(out, "  {:<10} {count}", gender.label());
    }

    if !stats.by_blood_type.is_empty() {
        out.push_str("\nNhóm máu\n");
        for (blood_type, count) in &stats.by_blood_type {
            let _ = writeln!(out, "  {:<10} {count}", blood_type.as_str());
        }
    }

    out.push_str("\nĐộ tuổi\n");
    for (bracket, count) in &stats.by_age {
        let _ = writeln!(out, "  {:<10} {count}", bracket.label());
    }

    out.push_str("\nTiếp nhận theo tháng\n");
    let peak = stats
        .monthly_intake
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    for (label, count) in &stats.monthly_intake {
        let width = if peak == 0 { 0 } else { count * BAR_WIDTH / peak };
        let _ = writeln!(
            out,
            "  {label}  {:<pad$} {count}",
            "█".repeat(width),
            pad = BAR_WIDTH
        );
    }

    out.trim_end().to_string()
}
