//! 内容地址模板
//!
//! 同一个路径片段（如 `assignments`）生成四个地址构造函数，以及反向解析用的正则。
//! 构造和解析来自同一份模板，`course_and_content_id_from_url(api_url(a, b)) == (a, b)`。

use regex::Regex;

/// API 地址前缀
const API_PREFIX: &str = "/api/v1";

/// 某一类内容的地址集合
#[derive(Debug)]
pub struct ContentUrls {
    segment: &'static str,
    id_pattern: Regex,
}

impl ContentUrls {
    /// 根据路径片段创建
    ///
    /// # 参数
    /// - `segment`: 路径片段，例如 `assignments`、`discussion_topics`
    pub fn new(segment: &'static str) -> Self {
        // API 地址和页面地址都能匹配：可选的站点、可选的 /api/v1、可选的查询或锚点
        let pattern = format!(
            r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://[^/]+)?(?:{})?/courses/(\d+)/{}/(\d+)(?:[/?#].*)?$",
            regex::escape(API_PREFIX),
            regex::escape(segment)
        );
        Self {
            segment,
            // 片段已转义，模式总是合法的
            id_pattern: Regex::new(&pattern).expect("内容地址正则无效"),
        }
    }

    pub fn segment(&self) -> &'static str {
        self.segment
    }

    /// 单条内容的 API 地址
    pub fn api_url(&self, course_id: u64, content_id: u64) -> String {
        format!("{}/courses/{}/{}/{}", API_PREFIX, course_id, self.segment, content_id)
    }

    /// 内容列表的 API 地址
    pub fn all_api_url(&self, course_id: u64) -> String {
        format!("{}/courses/{}/{}", API_PREFIX, course_id, self.segment)
    }

    /// 单条内容的页面地址
    pub fn html_url(&self, course_id: u64, content_id: u64) -> String {
        format!("/courses/{}/{}/{}", course_id, self.segment, content_id)
    }

    /// 内容列表的页面地址
    pub fn all_html_url(&self, course_id: u64) -> String {
        format!("/courses/{}/{}", course_id, self.segment)
    }

    /// 从地址中解析 (课程ID, 内容ID)
    pub fn course_and_content_id_from_url(&self, url: &str) -> Option<(u64, u64)> {
        let caps = self.id_pattern.captures(url.trim())?;
        let course_id = caps.get(1)?.as_str().parse().ok()?;
        let content_id = caps.get(2)?.as_str().parse().ok()?;
        Some((course_id, content_id))
    }

    /// 地址是否指向本类内容的某一条
    pub fn is_valid_url(&self, url: &str) -> bool {
        self.course_and_content_id_from_url(url).is_some()
    }
}
