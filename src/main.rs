// ==========================================
// 材料价格台账 - 命令行入口
// ==========================================
// 用法:
//   material-price-ledger import <file> [price_source_id]
//   material-price-ledger price <material_id> [YYYY-MM-DD] [price_source_id]
// 数据库: 环境变量 MATERIAL_PRICE_LEDGER_DB_PATH，缺省为用户本地数据目录
// 语言: 环境变量 MATERIAL_PRICE_LEDGER_LOCALE（zh-CN / en），缺省中文
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use material_price_ledger::api::ApiError;
use material_price_ledger::app::{get_default_db_path, AppState};
use material_price_ledger::i18n::t;
use material_price_ledger::ImportRequest;

const USAGE: &str = "用法:
  material-price-ledger import <file> [price_source_id]
  material-price-ledger price <material_id> [YYYY-MM-DD] [price_source_id]";

#[tokio::main]
async fn main() -> Result<()> {
    material_price_ledger::logging::init();
    let locale = material_price_ledger::i18n::set_locale(
        &std::env::var("MATERIAL_PRICE_LEDGER_LOCALE").unwrap_or_default(),
    );

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    let db_path = get_default_db_path();
    tracing::info!(
        version = material_price_ledger::VERSION,
        db_path = %db_path,
        locale,
        "{}",
        material_price_ledger::APP_NAME
    );
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match command.as_str() {
        "import" => {
            let file = args.next().context(USAGE)?;
            let request = ImportRequest {
                price_source_id: args.next(),
                ..Default::default()
            };

            match state.import_api.import_file(&file, request).await {
                Ok(response) => {
                    println!("{}", response.message);
                    for error in &response.errors {
                        println!("  [{}] {}: {}", error.row_number, error.row_ref, error.reason);
                    }
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(ApiError::ImportInProgress) => bail!(t("import.in_progress")),
                Err(e) => bail!(e),
            }
        }
        "price" => {
            let material_id = args.next().context(USAGE)?;
            let date = args
                .next()
                .map(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d"))
                .transpose()
                .context("日期格式应为 YYYY-MM-DD")?;
            let source_id = args.next();

            let record = state
                .price_api
                .get_effective_price(&material_id, source_id.as_deref(), date)
                .await?;
            match record {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("无有效价格: {}", material_id),
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
