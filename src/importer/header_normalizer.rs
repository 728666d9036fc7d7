// ==========================================
// 材料价格台账 - 表头归一化
// ==========================================
// 职责: 原始表头单元格 → 可比较的小写记号
// 规则: 小写 / 去重音 / 标点视为空白 / 合并空白
// 性质: 纯函数，幂等
// ==========================================

use crate::domain::types::CellValue;

/// 归一化表头单元格（任意取值）
pub fn normalize_header(cell: &CellValue) -> String {
    match cell.as_text() {
        Some(text) => normalize_text(&text),
        None => String::new(),
    }
}

/// 归一化文本
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut folded = String::with_capacity(lowered.len());

    for c in lowered.chars() {
        match fold_char(c) {
            Folded::Keep(c) => folded.push(c),
            Folded::Pair(a, b) => {
                folded.push(a);
                folded.push(b);
            }
            Folded::Space => folded.push(' '),
            Folded::Drop => {}
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum Folded {
    Keep(char),
    Pair(char, char),
    Space,
    Drop,
}

fn fold_char(c: char) -> Folded {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => Folded::Keep('a'),
        'ç' => Folded::Keep('c'),
        'è' | 'é' | 'ê' | 'ë' => Folded::Keep('e'),
        'ì' | 'í' | 'î' | 'ï' => Folded::Keep('i'),
        'ñ' => Folded::Keep('n'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => Folded::Keep('o'),
        'ù' | 'ú' | 'û' | 'ü' => Folded::Keep('u'),
        'ý' | 'ÿ' => Folded::Keep('y'),
        'æ' => Folded::Pair('a', 'e'),
        'œ' => Folded::Pair('o', 'e'),
        'ß' => Folded::Pair('s', 's'),
        // 组合附加符号（例如分解形式的重音）
        '\u{0300}'..='\u{036f}' => Folded::Drop,
        c if c.is_alphanumeric() => Folded::Keep(c),
        _ => Folded::Space,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_text("  Abrégé "), "abrege");
        assert_eq!(normalize_text("MATIÈRE"), "matiere");
        assert_eq!(normalize_text("Libellé"), "libelle");
        assert_eq!(normalize_text("Prix_Min"), "prix min");
        assert_eq!(normalize_text("Prix (€/t)"), "prix t");
        assert_eq!(normalize_text("Cœur"), "coeur");
    }

    #[test]
    fn test_normalize_decomposed_accent() {
        // "é" 分解形式: e + U+0301
        assert_eq!(normalize_text("Abre\u{0301}ge\u{0301}"), "abrege");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "Abrégé",
            "  Prix   min ",
            "price_max",
            "Libellé / Nom",
            "İstanbul",
            "Straße",
            "",
            "---",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalize_header_cells() {
        assert_eq!(normalize_header(&CellValue::from_raw("Montant")), "montant");
        assert_eq!(normalize_header(&CellValue::Number(2024.0)), "2024");
        assert_eq!(normalize_header(&CellValue::Empty), "");
    }
}
