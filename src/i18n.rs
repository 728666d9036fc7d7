// ==========================================
// 材料价格台账 - 国际化
// ==========================================
// 职责: 导入汇总行与拒绝原因的本地化文案
// 文案: locales/zh-CN.yml, locales/en.yml
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 已提供文案的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 缺省语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 将请求的语言代码映射到已支持的语言
///
/// 只比较主语言子标签（"en-US" / "en_GB" → "en"，"zh" → "zh-CN"），
/// 未提供文案的语言回退到缺省语言
pub fn resolve_locale(requested: &str) -> &'static str {
    let primary = requested
        .trim()
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|locale| locale.split('-').next() == Some(primary.as_str()))
        .unwrap_or(DEFAULT_LOCALE)
}

/// 设置语言，返回实际生效的语言
///
/// # 参数
/// - locale: 语言代码（例如 "zh-CN"、"en"、"en-US"）
pub fn set_locale(locale: &str) -> &'static str {
    let resolved = resolve_locale(locale);
    rust_i18n::set_locale(resolved);
    resolved
}

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use material_price_ledger::i18n::t;
/// let msg = t("import.no_data_rows");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息，填充 %{name} 占位符
///
/// # 示例
/// ```no_run
/// use material_price_ledger::i18n::t_with_args;
/// let msg = t_with_args("import.summary_partial", &[("success", "7"), ("errors", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| {
        text.replace(&format!("%{{{}}}", name), value)
    })
}
