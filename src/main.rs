// ==========================================
// GoatOS 牧场记录系统 - 命令行入口
// ==========================================
// 用法: goatos [db_path] [today]
// 输出: 当日提醒 (JSON)
// ==========================================

use anyhow::Context;
use goatos::app::{get_default_db_path, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    goatos::logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(get_default_db_path);
    let today = args
        .next()
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());

    tracing::info!("==================================================");
    tracing::info!("{} 系统版本: {}", goatos::APP_NAME, goatos::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let alerts = state
        .alert_api
        .get_dashboard_alerts(&today)
        .await
        .with_context(|| format!("计算 {} 的提醒失败", today))?;

    tracing::info!(
        farm = %state.farm_settings.farm_name,
        total = alerts.total(),
        skipped = alerts.skipped.len(),
        "提醒计算完成"
    );

    println!("{}", serde_json::to_string_pretty(&alerts)?);
    Ok(())
}
