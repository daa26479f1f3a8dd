use csv_insight::{
    intent::{ChartSource, IntentKind, IntentResolver, detect_statistic, extract_count},
    keywords::{ChartType, KeywordEntry, KeywordTable},
};

fn kinds(resolver: &IntentResolver<'_>, query: &str, suggestion: Option<&str>) -> Vec<IntentKind> {
    resolver
        .classify(query, suggestion)
        .into_iter()
        .map(|intent| intent.kind)
        .collect()
}

#[test]
fn table_order_decides_between_competing_phrases() {
    let table = KeywordTable::default();
    assert_eq!(
        table.resolve("compare the trend across categories"),
        Some(ChartType::BarChart)
    );
    assert_eq!(
        table.resolve("Show the TREND of sales"),
        Some(ChartType::LineChart)
    );
    assert_eq!(table.resolve("nothing relevant"), None);
}

#[test]
fn custom_table_order_is_respected() {
    let table = KeywordTable::new(vec![
        KeywordEntry {
            chart: ChartType::Histogram,
            phrases: vec!["Spread".to_string()],
        },
        KeywordEntry {
            chart: ChartType::Histogram,
            phrases: vec!["distribution".to_string()],
        },
    ]);
    assert!(table.is_err(), "a chart type may only be listed once");

    let table = KeywordTable::new(vec![
        KeywordEntry {
            chart: ChartType::Histogram,
            phrases: vec!["Spread".to_string()],
        },
        KeywordEntry {
            chart: ChartType::ScatterPlot,
            phrases: vec!["relationship".to_string()],
        },
    ])
    .expect("valid table");
    assert_eq!(
        table.resolve("the relationship and spread of ages"),
        Some(ChartType::Histogram)
    );
}

#[test]
fn model_text_is_consulted_before_the_query() {
    let table = KeywordTable::default();
    let resolver = IntentResolver::new(&table);

    assert_eq!(
        resolver.resolve_chart(Some("A line chart suits this."), "show categories"),
        Some((ChartType::LineChart, ChartSource::Suggestion))
    );
    assert_eq!(
        resolver.resolve_chart(Some("I am not sure."), "show categories"),
        Some((ChartType::BarChart, ChartSource::Query))
    );
}

#[test]
fn statistic_and_chart_are_both_dispatched() {
    let table = KeywordTable::default();
    let resolver = IntentResolver::new(&table);

    assert_eq!(
        kinds(&resolver, "highest income as a bar chart", None),
        vec![IntentKind::HighestValue, IntentKind::BarChart]
    );
    assert_eq!(
        kinds(&resolver, "bottom 4 ages", Some("use a histogram")),
        vec![IntentKind::BottomN, IntentKind::Histogram]
    );
    assert_eq!(kinds(&resolver, "tell me a story", None), vec![IntentKind::Unknown]);
}

#[test]
fn top_and_bottom_need_a_positive_count() {
    let intent = detect_statistic("list the Top 10 cities").expect("top n");
    assert_eq!(intent.kind, IntentKind::TopN);
    assert_eq!(intent.n, Some(10));

    assert_eq!(detect_statistic("top earners"), None);
    assert_eq!(extract_count("bottom 0 rows"), None);

    let intent = detect_statistic("the bottom 2 by price").expect("bottom n");
    assert_eq!(intent.kind, IntentKind::BottomN);
    assert_eq!(intent.n, Some(2));
}

#[test]
fn highest_beats_lowest_and_counts() {
    let intent = detect_statistic("lowest then HIGHEST of the top 3").expect("statistic");
    assert_eq!(intent.kind, IntentKind::HighestValue);
    assert_eq!(intent.n, None);
}

#[test]
fn every_default_phrase_resolves_to_its_chart() {
    let table = KeywordTable::default();
    for entry in table.entries() {
        for phrase in &entry.phrases {
            assert_eq!(table.resolve(phrase), Some(entry.chart), "phrase {phrase:?}");
            let shouted = format!("PLEASE USE {} NOW", phrase.to_uppercase());
            assert_eq!(table.resolve(&shouted), Some(entry.chart), "phrase {phrase:?}");
        }
    }
}

proptest::proptest! {
    #[test]
    fn text_without_phrases_never_resolves(text in "[0-9 .,!?:;-]{0,48}") {
        proptest::prop_assert_eq!(KeywordTable::default().resolve(&text), None);
    }
}
