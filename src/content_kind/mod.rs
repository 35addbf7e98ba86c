//! 内容类型层
//!
//! ## 模块划分
//!
//! - `url_templates` - 由路径片段生成地址构造函数和反向解析正则
//! - `kind` - `ContentKind`：get / list / put 统一操作
//! - `dispatch` - 按地址或 JSON 结构判断类型
//!
//! 所有列表操作都是把分页获取指向对应类型的列表地址，翻页逻辑只写在 `api::paged_fetch` 一处。

pub mod dispatch;
pub mod kind;
pub mod url_templates;

pub use dispatch::{
    content_from_url, course_and_content_id_from_url, kind_for_data, kind_for_url,
    matching_kinds_for_data,
};
pub use kind::{get_typed, list_typed, put_typed, ContentKind};
pub use url_templates::ContentUrls;
