//! API 模块
//!
//! 分页获取与 `Link` 头解析，所有列表类请求都基于这里

pub mod link_header;
pub mod paged_fetch;

// 重新导出常用函数
pub use link_header::{next_link, parse_links, LinkEntry};
pub use paged_fetch::{collect_all, extract_page_items, merge_streams, paged_fetch, paged_fetch_as};
