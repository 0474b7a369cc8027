//! 规范文件名
//!
//! 获取策略从不自己决定输出路径，统一由这里给出文件名。

/// 供应商 ID 为空时使用的文件名
const FALLBACK_STEM: &str = "document";

/// 供应商 ID → 规范文件名
///
/// 转小写，`[a-z0-9_-]` 以外的字符替换为 `_`，加 `.pdf` 后缀。
pub fn canonical_name(vendor_id: &str) -> String {
    let stem: String = vendor_id
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        format!("{}.pdf", FALLBACK_STEM)
    } else {
        format!("{}.pdf", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_map_to_pdf_names() {
        assert_eq!(canonical_name("bizgram"), "bizgram.pdf");
        assert_eq!(canonical_name("pc_themes"), "pc_themes.pdf");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        assert_eq!(canonical_name("PC Themes/Ltd"), "pc_themes_ltd.pdf");
        assert_eq!(canonical_name("  Fuwell  "), "fuwell.pdf");
    }

    #[test]
    fn empty_id_has_a_fallback() {
        assert_eq!(canonical_name(""), "document.pdf");
        assert_eq!(canonical_name("   "), "document.pdf");
    }
}
