use url::Url;

pub fn to_absolute_url(base: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }

    if let Some(path_without_slashes) = href.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), path_without_slashes);
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// 丢弃空行并去除每行首尾空白
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 按空白切分后丢弃首尾若干 token
///
/// 用于剥离站点注入正文首尾的固定样板文字。依赖样板恰好占用的 token 数，
/// 页面结构一变就会失准，只应在确认过标记的站点上启用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStrip {
    pub leading: usize,
    pub trailing: usize,
}

impl TokenStrip {
    pub fn apply(&self, raw: &str) -> String {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() <= self.leading + self.trailing {
            return String::new();
        }
        tokens[self.leading..tokens.len() - self.trailing].join("\n")
    }
}
