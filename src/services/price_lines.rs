//! OCR 文本中的型号行筛选

/// 只保留包含关注型号的行
#[derive(Debug, Clone)]
pub struct PriceLineFilter {
    models: Vec<String>,
}

impl PriceLineFilter {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models
                .into_iter()
                .map(Into::into)
                .map(|m: String| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// 显卡型号
    pub fn default_models() -> Self {
        Self::new([
            "3060", "3070", "3080", "3090", "4060", "4070", "4080", "4090", "6600", "6650", "6700",
            "6800", "6900", "7600", "7900",
        ])
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// 按原顺序返回命中任一型号的行；型号列表为空时返回所有非空行
    pub fn matching_lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .filter(|line| self.models.is_empty() || self.models.iter().any(|m| line.contains(m.as_str())))
            .collect()
    }
}

impl Default for PriceLineFilter {
    fn default() -> Self {
        Self::default_models()
    }
}
