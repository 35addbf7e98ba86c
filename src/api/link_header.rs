//! `Link` 响应头解析
//!
//! 形如 `<https://x/api?page=2>; rel="next", <https://x/api?page=9>; rel="last"`

use std::sync::LazyLock;

use regex::Regex;

/// 一个链接条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    /// `rel` 可能包含多个以空格分隔的关系
    pub rels: Vec<String>,
}

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]*)>((?:\s*;\s*[^;,<]+)*)"#).expect("Link 正则无效"));

static REL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\brel\s*=\s*(?:"([^"]*)"|([^\s;,"]+))"#).expect("rel 正则无效"));

/// 解析整个 `Link` 头
pub fn parse_links(header: &str) -> Vec<LinkEntry> {
    LINK_RE
        .captures_iter(header)
        .filter_map(|cap| {
            let url = cap.get(1)?.as_str().trim().to_string();
            let params = cap.get(2).map(|m| m.as_str()).unwrap_or("");
            let rels = REL_RE
                .captures(params)
                .and_then(|r| r.get(1).or_else(|| r.get(2)))
                .map(|m| {
                    m.as_str()
                        .split_whitespace()
                        .map(|s| s.to_ascii_lowercase())
                        .collect()
                })
                .unwrap_or_default();
            Some(LinkEntry { url, rels })
        })
        .collect()
}

/// 查找指定关系的链接
pub fn find_rel(header: &str, rel: &str) -> Option<String> {
    parse_links(header)
        .into_iter()
        .find(|entry| entry.rels.iter().any(|r| r == rel))
        .map(|entry| entry.url)
}

/// 下一页链接
pub fn next_link(header: &str) -> Option<String> {
    find_rel(header, "next")
}
