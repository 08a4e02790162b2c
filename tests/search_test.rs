//! Integration tests for searching a MemoryStore end to end

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use mapsearch::field::{FieldSpec, TextExtractor};
use mapsearch::index::{DocumentFilter, index_name};
use mapsearch::prelude::*;
use mapsearch::store::{MapFunction, QueryOptions, QueryResponse, Stale};
use serde_json::{Value, json};

fn store_with(docs: Vec<Value>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for doc in docs {
        store.put(doc).unwrap();
    }
    store
}

fn ids(response: &SearchResponse) -> Vec<&str> {
    response.rows().iter().map(|row| row.id.as_str()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

fn fox_corpus() -> Arc<MemoryStore> {
    store_with(vec![
        json!({"_id": "d3", "text": "fox cat cat"}),
        json!({"_id": "d1", "text": "fox fox fox"}),
        json!({"_id": "d2", "text": "fox fox cat"}),
    ])
}

#[tokio::test]
async fn test_term_frequency_and_length_norm() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "text": "the quick fox"}),
        json!({"_id": "2", "text": "the quick quick dog"}),
    ]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(SearchOptions::new().query("quick").fields(["text"]))
        .await?;

    assert_eq!(response.total_rows(), 2);
    assert_eq!(ids(&response), vec!["2", "1"]);
    // "quick" occurs 3 times among the candidates: twice in doc 2, once in doc 1.
    let rows = response.rows();
    assert_close(rows[0].score, (2.0 / 3.0) * (1.0 / 3.0) * 1.0 / 3.0_f64.sqrt());
    assert_close(rows[1].score, (1.0 / 3.0) * (1.0 / 3.0) * 1.0 / 2.0_f64.sqrt());
    Ok(())
}

#[tokio::test]
async fn test_repeated_terms_raise_document_frequency() -> Result<()> {
    let searcher = Searcher::new(fox_corpus());

    let response = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]))
        .await?;

    // 6 fox postings over 3 documents, so df is 6.
    let norm = 3.0_f64.sqrt();
    let scores: Vec<f64> = response.rows().iter().map(|row| row.score).collect();
    assert_eq!(ids(&response), vec!["d1", "d2", "d3"]);
    assert_close(scores[0], (3.0 / 6.0) * (1.0 / 6.0) / norm);
    assert_close(scores[1], (2.0 / 6.0) * (1.0 / 6.0) / norm);
    assert_close(scores[2], (1.0 / 6.0) * (1.0 / 6.0) / norm);
    Ok(())
}

#[tokio::test]
async fn test_minimum_should_match() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "all", "text": "red green blue"}),
        json!({"_id": "two", "text": "red green"}),
        json!({"_id": "one", "text": "red"}),
    ]);
    let searcher = Searcher::new(store);
    let options = SearchOptions::new().query("red green blue").fields(["text"]);

    let strict = searcher.search(options.clone()).await?;
    assert_eq!(ids(&strict), vec!["all"]);

    let three_quarters = searcher.search(options.clone().mm("75%")).await?;
    assert_eq!(ids(&three_quarters), vec!["all"]);

    let two_thirds = searcher.search(options.clone().mm("66%")).await?;
    assert_eq!(two_thirds.total_rows(), 2);
    assert!(!ids(&two_thirds).contains(&"one"));

    let any = searcher.search(options.mm("0")).await?;
    assert_eq!(any.total_rows(), 3);
    Ok(())
}

#[tokio::test]
async fn test_prefix_variants_are_found() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "text": "quickly"}),
        json!({"_id": "2", "text": "slow"}),
    ]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(SearchOptions::new().query("quick").fields(["text"]).highlighting(true))
        .await?;

    assert_eq!(ids(&response), vec!["1"]);
    assert_eq!(
        response.rows()[0].highlighting.as_ref().unwrap()["text"],
        "<strong>quickly</strong>"
    );
    Ok(())
}

#[tokio::test]
async fn test_pagination() -> Result<()> {
    let searcher = Searcher::new(fox_corpus());

    let all = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]))
        .await?;
    assert_eq!(ids(&all), vec!["d1", "d2", "d3"]);

    let page = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).skip(1).limit(1))
        .await?;
    assert_eq!(page.total_rows(), 3);
    assert_eq!(ids(&page), vec!["d2"]);

    let past_end = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).skip(5))
        .await?;
    assert_eq!(past_end.total_rows(), 3);
    assert!(past_end.rows().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_negative_limit_returns_every_row() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "text": "fox"}),
        json!({"_id": "2", "text": "fox fox"}),
    ]);
    let searcher = Searcher::new(store);

    let options = SearchOptions::from_json(r#"{"q":"fox","fields":["text"],"limit":-1}"#)?;
    let response = searcher.search(options).await?;
    assert_eq!(response.total_rows(), 2);
    assert_eq!(response.rows().len(), 2);

    let options = SearchOptions::from_json(r#"{"q":"fox","fields":["text"],"skip":-1}"#)?;
    let response = searcher.search(options).await?;
    assert_eq!(response.rows().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_prefix_covers_supplementary_characters() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "text": "fox\u{1d4b3}"}),
        json!({"_id": "2", "text": "foy"}),
    ]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]))
        .await?;
    assert_eq!(ids(&response), vec!["1"]);
    Ok(())
}

#[tokio::test]
async fn test_include_docs() -> Result<()> {
    let searcher = Searcher::new(fox_corpus());

    let response = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).include_docs(true))
        .await?;

    for row in response.rows() {
        let doc = row.doc.as_ref().unwrap();
        assert_eq!(doc["_id"], json!(row.id));
        assert!(row.highlighting.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_query_skips_the_store() -> Result<()> {
    let store = fox_corpus();
    let searcher = Searcher::new(store.clone());

    for query in ["", "   ", "the and of", "--"] {
        let response = searcher
            .search(SearchOptions::new().query(query).fields(["text"]))
            .await?;
        assert_eq!(response, SearchResponse::empty());
    }
    assert_eq!(store.query_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_wildcards() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "text": "quick fox"}),
        json!({"_id": "2", "text": "quiet dog"}),
        json!({"_id": "3", "text": "slow cat"}),
    ]);
    let searcher = Searcher::new(store);
    let search = |query: &'static str| {
        let searcher = searcher.clone();
        async move {
            searcher
                .search(SearchOptions::new().query(query).fields(["text"]))
                .await
        }
    };

    let prefix = search("qui*").await?;
    assert_eq!(ids(&prefix), vec!["1", "2"]);
    assert!(prefix.rows().iter().all(|row| row.score == 1.0));

    assert_eq!(ids(&search("*og").await?), vec!["2"]);
    assert_eq!(ids(&search("*ui*").await?), vec!["1", "2"]);
    assert_eq!(ids(&search("s*w").await?), vec!["3"]);
    assert!(search("q*i*k").await?.rows().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_wildcard_highlighting() -> Result<()> {
    let store = store_with(vec![json!({"_id": "1", "text": "Quick fox"})]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(
            SearchOptions::new()
                .query("qui*")
                .fields(["text"])
                .highlighting(true),
        )
        .await?;

    assert_eq!(
        response.rows()[0].highlighting.as_ref().unwrap()["text"],
        "<strong>Quick</strong> fox"
    );
    Ok(())
}

#[tokio::test]
async fn test_highlighting() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "title": "Foxes", "body": "The fox jumped over dogs"}),
    ]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(
            SearchOptions::new()
                .query("jumping")
                .fields(["title", "body"])
                .highlighting(true)
                .highlighting_markup("<em>", "</em>"),
        )
        .await?;

    let highlighting = response.rows()[0].highlighting.as_ref().unwrap();
    assert_eq!(highlighting["body"], "The fox <em>jumped</em> over dogs");
    assert!(!highlighting.contains_key("title"));
    Ok(())
}

#[tokio::test]
async fn test_field_boosts() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "body", "title": "cat", "body": "fox"}),
        json!({"_id": "title", "title": "fox", "body": "cat"}),
    ]);
    let searcher = Searcher::new(store);

    let response = searcher
        .search(
            SearchOptions::new()
                .query("fox")
                .field("title", 3.0)
                .field("body", 1.0),
        )
        .await?;

    assert_eq!(ids(&response), vec!["title", "body"]);
    assert_close(response.rows()[0].score, 0.5 * 0.5 * 3.0);
    assert_close(response.rows()[1].score, 0.5 * 0.5);
    Ok(())
}

#[tokio::test]
async fn test_deep_paths_and_custom_extractors() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "1", "meta": {"authors": [{"name": "Ann Lee"}, {"name": "Bob"}]}}),
        json!({"_id": "2", "meta": {"authors": []}, "code": "X-17"}),
    ]);
    let searcher = Searcher::new(store);

    let by_author = searcher
        .search(SearchOptions::new().query("bob").fields(["meta.authors.name"]))
        .await?;
    assert_eq!(ids(&by_author), vec!["1"]);

    let extractor: TextExtractor = Arc::new(|doc: &Value| {
        doc.get("code")
            .and_then(Value::as_str)
            .map(|code| code.replace('-', " product "))
    });
    let by_code = searcher
        .search(
            SearchOptions::new()
                .query("product")
                .fields(["code"])
                .get_text("code", extractor),
        )
        .await?;
    assert_eq!(ids(&by_code), vec!["2"]);
    Ok(())
}

#[tokio::test]
async fn test_index_follows_document_changes() -> Result<()> {
    let store = store_with(vec![json!({"_id": "1", "text": "red fox"})]);
    let searcher = Searcher::new(store.clone());
    let fox = || SearchOptions::new().query("fox").fields(["text"]);

    assert_eq!(searcher.search(fox()).await?.total_rows(), 1);

    store.put(json!({"_id": "1", "text": "red cat"}))?;
    assert_eq!(searcher.search(fox()).await?.total_rows(), 0);

    store.put(json!({"_id": "2", "text": "grey fox"}))?;
    assert_eq!(ids(&searcher.search(fox()).await?), vec!["2"]);

    store.remove("2")?;
    assert_eq!(searcher.search(fox()).await?.total_rows(), 0);
    Ok(())
}

#[tokio::test]
async fn test_stale_reads() -> Result<()> {
    let store = store_with(vec![json!({"_id": "1", "text": "fox"})]);
    let searcher = Searcher::new(store.clone());
    let fox = || SearchOptions::new().query("fox").fields(["text"]);

    assert_eq!(searcher.search(fox()).await?.total_rows(), 1);
    store.put(json!({"_id": "2", "text": "fox"}))?;

    assert_eq!(searcher.search(fox().stale(Stale::Ok)).await?.total_rows(), 1);
    assert_eq!(searcher.search(fox().stale(Stale::UpdateAfter)).await?.total_rows(), 1);
    assert_eq!(searcher.search(fox().stale(Stale::Ok)).await?.total_rows(), 2);
    Ok(())
}

#[tokio::test]
async fn test_build_and_destroy() -> Result<()> {
    let store = fox_corpus();
    let searcher = Searcher::new(store.clone());
    let name = index_name(&[FieldSpec::new("text", 1.0)], &["en".to_string()]);

    let built = searcher
        .search(SearchOptions::new().fields(["text"]).build(true))
        .await?;
    assert_eq!(serde_json::to_value(&built)?, json!({"ok": true}));
    assert_eq!(store.view_names(), vec![name.clone()]);

    let destroyed = searcher
        .search(SearchOptions::new().fields(["text"]).destroy(true))
        .await?;
    assert_eq!(destroyed, SearchResponse::ack());
    assert!(store.view_names().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_field_order_and_boosts_share_one_index() -> Result<()> {
    let store = store_with(vec![json!({"_id": "1", "a": "fox", "b": "cat"})]);
    let searcher = Searcher::new(store.clone());

    searcher
        .search(SearchOptions::new().query("fox").field("a", 1.0).field("b", 1.0))
        .await?;
    searcher
        .search(SearchOptions::new().query("fox").field("a", 5.0).field("b", 2.0))
        .await?;

    assert_eq!(store.view_names().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_document_filter() -> Result<()> {
    let store = store_with(vec![
        json!({"_id": "public", "text": "fox", "public": true}),
        json!({"_id": "private", "text": "fox", "public": false}),
        json!({"_id": "broken", "text": "fox", "public": "maybe"}),
    ]);
    let searcher = Searcher::new(store.clone());
    let filter: DocumentFilter = Arc::new(|doc: &Value| {
        doc["public"]
            .as_bool()
            .ok_or_else(|| anyhow!("'public' is not a boolean"))
    });

    let response = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).filter(filter))
        .await?;

    assert_eq!(ids(&response), vec!["public"]);
    let errors = store.map_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("broken"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_options() {
    let searcher = Searcher::new(fox_corpus());

    let missing_query = searcher.search(SearchOptions::new().fields(["text"])).await;
    assert!(matches!(missing_query, Err(MapSearchError::Query(_))));

    let missing_fields = searcher.search(SearchOptions::new().query("fox")).await;
    assert!(matches!(missing_fields, Err(MapSearchError::Query(_))));

    let bad_mm = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).mm("most"))
        .await;
    assert!(matches!(bad_mm, Err(MapSearchError::Query(_))));

    let bad_language = searcher
        .search(SearchOptions::new().query("fox").fields(["text"]).language("xx"))
        .await;
    assert!(matches!(bad_language, Err(MapSearchError::Analysis(_))));
}

#[tokio::test]
async fn test_options_from_json() -> Result<()> {
    let searcher = Searcher::new(fox_corpus());
    let options = SearchOptions::from_json(
        r#"{"q": "fox", "fields": {"text": 2}, "skip": 1, "include_docs": true}"#,
    )?;

    let response = searcher.search(options).await?;

    assert_eq!(response.total_rows(), 3);
    assert_eq!(ids(&response), vec!["d2", "d3"]);
    assert!(response.rows()[0].doc.is_some());
    Ok(())
}

#[derive(Debug)]
struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn query(
        &self,
        _map_fn: Arc<dyn MapFunction>,
        _options: QueryOptions,
    ) -> Result<QueryResponse> {
        Err(MapSearchError::store("connection refused"))
    }

    async fn get(&self, _id: &str) -> Result<Value> {
        Err(MapSearchError::store("connection refused"))
    }
}

#[tokio::test]
async fn test_store_errors_propagate() {
    let searcher = Searcher::new(Arc::new(UnavailableStore));

    for options in [
        SearchOptions::new().query("fox").fields(["text"]),
        SearchOptions::new().query("fo*").fields(["text"]),
        SearchOptions::new().fields(["text"]).build(true),
    ] {
        let result = searcher.search(options).await;
        assert!(
            matches!(&result, Err(MapSearchError::Store(msg)) if msg == "connection refused"),
            "{result:?}"
        );
    }
}
