use std::sync::Arc;

use futures::StreamExt;
use lms_content::content_kind::{content_from_url, list_typed};
use lms_content::infrastructure::HttpResponse;
use lms_content::models::{HttpMethod, Page, ValidationStatus};
use lms_content::utils::logging;
use lms_content::validations::{DiscussionInitialPost, InsecureLinks, Validation};
use lms_content::{
    collect_all, kind_for_data, CanvasClient, Config, ContentKind, ContentLookup, Course, FakeTransport,
    ValidationRunner,
};
use serde_json::json;

const BASE: &str = "https://lms.test";

fn test_config(report: &str) -> Config {
    Config {
        base_url: BASE.to_string(),
        api_token: "token".to_string(),
        per_page: 2,
        output_log_file: report.to_string(),
        ..Config::default()
    }
}

fn client(fake: Arc<FakeTransport>, config: &Config) -> CanvasClient {
    CanvasClient::with_transport(config, fake).with_list_config(config.list_call_config())
}

fn report_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("lms_content_it_{}_{}.txt", name, std::process::id()))
        .to_string_lossy()
        .to_string()
}

/// 课程 7 的页面分两页返回
fn paged_pages(fake: &FakeTransport) {
    fake.on_get_page(
        format!("{}/api/v1/courses/7/pages?per_page=2", BASE),
        json!([
            {"page_id": 1, "url": "a", "title": "A", "body": "<p>a</p>"},
            {"page_id": 2, "url": "b", "title": "B", "body": "<a href=\"http://old.test\">old</a>"}
        ]),
        Some("https://lms.test/api/v1/courses/7/pages?page=2&per_page=2"),
    );
    fake.on_get_page(
        format!("{}/api/v1/courses/7/pages?page=2&per_page=2", BASE),
        json!([{"page_id": 3, "url": "c", "title": "C", "body": null}]),
        None,
    );
}

#[tokio::test]
async fn test_list_pages_across_pagination() {
    logging::init(false);
    let fake = Arc::new(FakeTransport::new());
    paged_pages(&fake);
    let config = test_config(&report_path("list"));
    let client = client(fake.clone(), &config);

    let pages: Vec<Page> = collect_all(list_typed::<Page>(&client, 7, None)).await.unwrap();
    let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|r| r.headers.get("Authorization").map(String::as_str) == Some("Bearer token")));
}

#[tokio::test]
async fn test_stream_is_pull_based() {
    let fake = Arc::new(FakeTransport::new());
    paged_pages(&fake);
    let config = test_config(&report_path("pull"));
    let client = client(fake.clone(), &config);

    let mut stream = ContentKind::Page.data_generator(&client, 7, None);
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.name(), "A");
    drop(stream);

    assert_eq!(fake.request_count(), 1);
}

#[tokio::test]
async fn test_show_by_url_and_dispatch_by_shape() {
    let fake = Arc::new(FakeTransport::new());
    let record = json!({"id": 11, "title": "Final", "quiz_type": "assignment", "description": "<p>good luck</p>"});
    fake.on_get_json(format!("{}/api/v1/courses/7/quizzes/11", BASE), record.clone());
    let config = test_config(&report_path("show"));
    let client = client(fake, &config);

    let lookup = content_from_url(&client, "https://lms.test/courses/7/quizzes/11", None)
        .await
        .unwrap()
        .unwrap();
    let content = match lookup {
        ContentLookup::Found(content) => content,
        ContentLookup::NotFound { message } => panic!("not found: {}", message),
    };
    assert_eq!(content.kind(), ContentKind::Quiz);
    assert_eq!(kind_for_data(&record), Some(ContentKind::Quiz));

    let missing = content_from_url(&client, "/courses/7/quizzes/12", None).await.unwrap().unwrap();
    assert!(!missing.is_found());
}

#[tokio::test]
async fn test_runner_fixes_insecure_links() {
    let fake = Arc::new(FakeTransport::new());
    fake.on_get_json(format!("{}/api/v1/courses/7", BASE), json!({"id": 7, "name": "Physics"}));
    for segment in ["assignments", "discussion_topics", "quizzes"] {
        fake.on_get_json(format!("{}/api/v1/courses/7/{}?per_page=2", BASE, segment), json!([]));
    }
    fake.on_sequence(
        HttpMethod::Get,
        format!("{}/api/v1/courses/7/pages?include%5B%5D=body&per_page=2", BASE),
        vec![
            HttpResponse::json(
                200,
                &json!([{"page_id": 2, "url": "b", "title": "B", "body": "<a href=\"http://old.test\">old</a>"}]),
            ),
            HttpResponse::json(
                200,
                &json!([{"page_id": 2, "url": "b", "title": "B", "body": "<a href=\"https://old.test\">old</a>"}]),
            ),
        ],
    );
    fake.on(
        HttpMethod::Put,
        format!("{}/api/v1/courses/7/pages/2", BASE),
        HttpResponse::json(
            200,
            &json!({"page_id": 2, "url": "b", "title": "B", "body": "<a href=\"https://old.test\">old</a>"}),
        ),
    );

    let report = report_path("fix");
    let config = test_config(&report);
    let runner = ValidationRunner::with_client(config.clone(), client(fake.clone(), &config));
    let validations: Vec<Box<dyn Validation>> = vec![Box::new(InsecureLinks)];
    let run = runner.run(7, validations, true).await.unwrap();
    let text = std::fs::read_to_string(&report).unwrap();
    std::fs::remove_file(&report).ok();

    assert_eq!(run.outcomes[0].result.success, ValidationStatus::Failure);
    assert_eq!(run.outcomes[0].final_status(), ValidationStatus::Success);
    assert_eq!(run.stats.fixed, 1);
    assert_eq!(fake.count_for(HttpMethod::Put), 1);
    assert!(text.contains("修复结果: 通过"));
}

#[tokio::test]
async fn test_fix_after_success_is_not_run() {
    let fake = Arc::new(FakeTransport::new());
    let config = test_config(&report_path("noop"));
    let client = client(fake.clone(), &config);

    let first = DiscussionInitialPost
        .fix(&client, &Course::from_id(7), Some(lms_content::ValidationResult::success()))
        .await;
    assert_eq!(first.success, ValidationStatus::NotRun);
    assert_eq!(fake.count_for(HttpMethod::Put), 0);
    assert_eq!(fake.request_count(), 0);
}

#[tokio::test]
#[ignore] // 需要真实的 LMS：设置 LMS_BASE_URL / LMS_API_TOKEN / LMS_TEST_COURSE 后运行 cargo test -- --ignored
async fn test_live_course_listing() {
    logging::init(true);
    let config = Config::from_env();
    let course_id: u64 = std::env::var("LMS_TEST_COURSE")
        .expect("需要设置 LMS_TEST_COURSE")
        .parse()
        .expect("LMS_TEST_COURSE 必须是数字");

    let client = CanvasClient::new(&config)
        .expect("创建客户端失败")
        .with_list_config(config.list_call_config());

    for kind in ContentKind::ALL {
        let items = collect_all(kind.data_generator(&client, course_id, None)).await;
        assert!(items.is_ok(), "列出{}失败: {:?}", kind, items.err());
    }
}
