//! 分页获取
//!
//! 把一个列表地址变成按需拉取的条目流：逐页请求，按 `Link: rel="next"` 翻页。
//! 流是惰性的，只有消费完当前页的条目才会请求下一页；停止消费就不会再发请求。

use async_stream::try_stream;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::link_header::next_link;
use crate::clients::CanvasClient;
use crate::error::AppResult;
use crate::models::CallConfig;

/// 从一页响应中取出条目列表
///
/// - 数组：整个数组
/// - 对象：按字段顺序找到的第一个数组字段（兼容 `{ "enrollment_terms": [...] }` 这类外层包装）
/// - 其他：`None`
pub fn extract_page_items(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

/// 分页获取 JSON 条目
///
/// # 参数
/// - `client`: API 客户端
/// - `url`: 列表地址，`config` 中的查询参数只拼接到这个首页地址上
/// - `config`: 调用配置，`fetch_init` 用于每一页
///
/// # 返回
/// 返回按响应顺序逐条产出的流；网络或解析错误作为 `Err` 产出后流结束
pub fn paged_fetch<'a>(
    client: &'a CanvasClient,
    url: &str,
    config: Option<&CallConfig>,
) -> impl Stream<Item = AppResult<Value>> + Send + 'a {
    let list_url = url.to_string();
    let config = config.cloned();

    try_stream! {
        let (mut page_url, config) = client.prepare_list_request(&list_url, config.as_ref())?;
        let mut page_no = 0usize;

        loop {
            page_no += 1;
            debug!("📄 请求第 {} 页: {}", page_no, page_url);

            let response = client.send_resolved(&page_url, &config).await?;

            if !response.is_success() {
                warn!("⚠️ 分页请求返回 {}，停止翻页: {}", response.status, page_url);
                break;
            }

            let next = response.link.as_deref().and_then(next_link);

            let items = match extract_page_items(response.body) {
                Some(items) => items,
                None => {
                    warn!("⚠️ 响应中没有找到数组，按空页处理: {}", page_url);
                    break;
                }
            };

            if items.is_empty() {
                debug!("第 {} 页为空，结束", page_no);
                break;
            }

            debug!("第 {} 页共 {} 条", page_no, items.len());
            for item in items {
                yield item;
            }

            match next {
                Some(next_url) => page_url = client.resolve_url(&next_url)?,
                None => break,
            }
        }
    }
}

/// 分页获取并反序列化为指定类型
pub fn paged_fetch_as<'a, T>(
    client: &'a CanvasClient,
    url: &str,
    config: Option<&CallConfig>,
) -> impl Stream<Item = AppResult<T>> + Send + 'a
where
    T: DeserializeOwned + Send + 'a,
{
    paged_fetch(client, url, config)
        .map(|item| item.and_then(|value| serde_json::from_value(value).map_err(Into::into)))
}

/// 等待整个流结束，按顺序收集全部条目
pub async fn collect_all<T, S>(stream: S) -> AppResult<Vec<T>>
where
    S: Stream<Item = AppResult<T>>,
{
    stream.try_collect().await
}

/// 把多个流首尾相接：依次耗尽每一个，不交错
pub fn merge_streams<'a, T: Send + 'a>(
    streams: Vec<BoxStream<'a, AppResult<T>>>,
) -> BoxStream<'a, AppResult<T>> {
    stream::iter(streams).flatten().boxed()
}
