use trendcast::trends::providers::aggregator::AggregatorProvider;
use trendcast::trends::providers::yahoo_realtime::{YahooRealtimeProvider, DEFAULT_URL};
use trendcast::trends::types::{ErrorKind, TrendError, TrendSource};
use trendcast::trends::try_fetch_trends;

const YAHOO: &str = include_str!("fixtures/yahoo_realtime.html");
const YAHOO_HASHED: &str = include_str!("fixtures/yahoo_realtime_hashed.html");
const YAHOO_LEGACY: &str = include_str!("fixtures/yahoo_realtime_legacy.html");
const TRENDS24: &str = include_str!("fixtures/trends24.html");

#[tokio::test]
async fn yahoo_current_layout_reads_titles_counts_and_links() {
    let raw = YahooRealtimeProvider::from_fixture(YAHOO)
        .fetch_latest()
        .await
        .expect("current layout parses");

    let titles: Vec<&str> = raw.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["台風", "ドラフト & 会議", "紅葉"]);
    assert_eq!(raw[0].metric.as_deref(), Some("2.1万件"));
    assert_eq!(raw[2].metric, None);
    assert_eq!(
        raw[0].link.as_deref(),
        Some("https://search.yahoo.co.jp/realtime/search?p=%E5%8F%B0%E9%A2%A8&rkf=1")
    );
    // absolute hrefs pass through
    assert!(raw[2]
        .link
        .as_deref()
        .unwrap()
        .starts_with("https://search.yahoo.co.jp/realtime/search?p="));
}

#[tokio::test]
async fn yahoo_hashed_layout_filters_on_class_shape() {
    let raw = YahooRealtimeProvider::parse_items_from_str(YAHOO_HASHED, DEFAULT_URL, "JP")
        .expect("hashed layout parses");
    let titles: Vec<&str> = raw.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["ハロウィン", "文化祭"]);
}

#[tokio::test]
async fn yahoo_falls_back_to_positional_links() {
    let raw = YahooRealtimeProvider::from_fixture(YAHOO_LEGACY)
        .fetch_latest()
        .await
        .expect("positional layout parses");

    let titles: Vec<&str> = raw.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["地震", "満月", "新刊"]);
    assert!(raw.iter().all(|r| r
        .link
        .as_deref()
        .is_some_and(|l| l.starts_with("https://search.yahoo.co.jp/realtime/search?p="))));
}

#[tokio::test]
async fn html_titles_keep_escaped_brackets_and_ampersands() {
    let page = r#"<html><body><ol>
        <li class="Trend_Trend__item__Kd8s2"><a href="/realtime/search?p=1">
          <h1 class="Trend_Trend__title__Zx9yu">&lt;物語&gt;シリーズ</h1></a></li>
        <li class="Trend_Trend__item__Kd8s2"><a href="/realtime/search?p=2">
          <h1 class="Trend_Trend__title__Zx9yu">AT&amp;amp;T</h1></a></li>
    </ol></body></html>"#;
    let raw = YahooRealtimeProvider::parse_items_from_str(page, DEFAULT_URL, "JP")
        .expect("current layout parses");

    let titles: Vec<&str> = raw.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["<物語>シリーズ", "AT&amp;T"]);
}

#[tokio::test]
async fn unknown_markup_is_reported_as_format_changed() {
    let page = "<html><body><div class=\"maintenance\">メンテナンス中</div></body></html>";
    let provider = YahooRealtimeProvider::from_fixture(page);

    let err = try_fetch_trends(&provider, 10).await.unwrap_err();
    match &err {
        TrendError::FormatChanged { source_name, tried } => {
            assert_eq!(*source_name, "yahoo_realtime");
            assert_eq!(
                tried,
                &vec!["2024-trend-module", "2022-hashed", "positional-search-links"]
            );
        }
        other => panic!("expected FormatChanged, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::FormatChanged);
}

#[tokio::test]
async fn aggregator_reads_only_the_newest_card() {
    let raw = AggregatorProvider::from_fixture(TRENDS24)
        .fetch_latest()
        .await
        .expect("trend card parses");

    let titles: Vec<&str> = raw.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["#おはよう", "月曜日", "休み"]);
    assert_eq!(raw[0].metric.as_deref(), Some("45K"));
    assert_eq!(raw[2].metric, None, "empty count is dropped");
    assert!(raw[0]
        .link
        .as_deref()
        .unwrap()
        .starts_with("https://twitter.com/search?q="));
}

#[tokio::test]
async fn aggregator_plain_ordered_list_fallback() {
    let page = r#"<html><body>
        <ol><li><a href="/t/a">Alpha</a></li><li><a href="/t/b">Beta</a></li></ol>
    </body></html>"#;
    let raw = AggregatorProvider::parse_items_from_str(page, "https://trends24.in/japan/", "JP")
        .expect("fallback parses");

    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1].title, "Beta");
    assert_eq!(raw[1].link.as_deref(), Some("https://trends24.in/t/b"));
}
