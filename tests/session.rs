use csv_insight::{
    dataset::Dataset,
    error::QueryError,
    intent::{ChartSource, IntentKind},
    keywords::{ChartType, KeywordTable},
    session::{Output, Session},
    suggest::StaticModel,
};

const SALES: &str = "region,sales,units\nnorth,10,1\nsouth,30,3\neast,20,2\n";

fn session_with(csv: &str, model: Option<StaticModel>) -> Session {
    let model = model.map(|m| Box::new(m) as Box<dyn csv_insight::suggest::SuggestionModel>);
    let mut session = Session::with_seed(KeywordTable::default(), model, Some(5));
    let dataset = Dataset::from_reader(csv.as_bytes(), b',', encoding_rs::UTF_8, "sales.csv")
        .expect("dataset");
    session.upload(dataset);
    session
}

#[test]
fn highest_and_bar_chart_are_both_answered() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("highest sales as a bar chart");

    let kinds: Vec<_> = answer.intents.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IntentKind::HighestValue, IntentKind::BarChart]);
    assert!(matches!(
        &answer.outputs[0],
        Output::Value(value) if value.value.to_string() == "30"
    ));
    let chart = answer.charts().next().expect("bar chart output");
    assert_eq!(chart.kind, ChartType::BarChart);
    assert_eq!(answer.failures().count(), 0);
}

#[test]
fn highest_value_question_reads_the_named_column() {
    let mut session = session_with("name,income\nA,120\nB,990\nC,45\n", None);

    let answer = session.ask("What is the highest value in income?");

    assert_eq!(answer.intents[0].columns, vec!["income"]);
    match &answer.outputs[..] {
        [Output::Value(value)] => {
            assert_eq!(value.column, "income");
            assert_eq!(value.value.to_string(), "990");
        }
        other => panic!("unexpected outputs {other:?}"),
    }
}

#[test]
fn top_n_returns_whole_rows() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("top 2 units");

    match &answer.outputs[..] {
        [Output::Rows(rows)] => {
            assert_eq!(rows.row_indices, vec![1, 2]);
            assert_eq!(rows.table.rows[0], vec!["south", "30", "3"]);
        }
        other => panic!("unexpected outputs {other:?}"),
    }
}

#[test]
fn questions_without_intent_report_unknown() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("tell me something nice");

    assert_eq!(answer.failures().collect::<Vec<_>>(), vec![&QueryError::UnknownIntent]);
}

#[test]
fn failed_statistic_does_not_block_the_chart() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("highest region shown as a pie chart");

    assert!(matches!(
        answer.failures().next(),
        Some(QueryError::NonNumericColumn { .. })
    ));
    let chart = answer.charts().next().expect("pie chart output");
    assert_eq!(chart.title, "Pie chart of region");
}

#[test]
fn model_reply_is_shown_and_used() {
    let mut session = session_with(
        SALES,
        Some(StaticModel::replying("I suggest a line chart of units over sales.")),
    );

    let answer = session.ask("compare sales and units");

    assert!(matches!(
        &answer.outputs[0],
        Output::Interpretation { text } if text.contains("line chart")
    ));
    let chart = answer.charts().next().expect("line chart output");
    assert_eq!(chart.kind, ChartType::LineChart);
    assert_eq!(chart.x_label, "sales");
    assert_eq!(chart.y_label, "units");
}

#[test]
fn replacing_the_upload_changes_the_columns() {
    let mut session = session_with(SALES, None);
    let replacement =
        Dataset::from_reader("age\n3\n9\n".as_bytes(), b',', encoding_rs::UTF_8, "ages.csv")
            .expect("dataset");
    session.upload(replacement);

    let answer = session.ask("lowest age");

    assert!(matches!(&answer.outputs[0], Output::Value(v) if v.value.to_string() == "3"));
    session.clear();
    assert_eq!(
        session.ask("lowest age").failures().collect::<Vec<_>>(),
        vec![&QueryError::NoDataset]
    );
}

#[test]
fn unnamed_index_column_does_not_capture_queries() {
    let mut session = session_with(",income\n0,100\n1,900\n2,450\n", None);

    let answer = session.ask("What is the highest value in income?");

    assert_eq!(answer.intents[0].columns, vec!["income"]);
    match &answer.outputs[..] {
        [Output::Value(value)] => {
            assert_eq!(value.column, "income");
            assert_eq!(value.value.to_string(), "900");
        }
        other => panic!("unexpected outputs {other:?}"),
    }
}

#[test]
fn ranking_a_text_column_reports_its_type() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("top 2 region");

    assert!(matches!(
        answer.failures().next(),
        Some(QueryError::NonNumericColumn { column, .. }) if column == "region"
    ));
}

#[test]
fn pie_chart_without_a_named_column_asks_for_one() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("show this as a pie chart");

    assert_eq!(
        answer.failures().collect::<Vec<_>>(),
        vec![&QueryError::UnresolvedColumn {
            operation: "pie chart".to_string()
        }]
    );
    assert_eq!(answer.charts().count(), 0);
}

#[test]
fn chart_intent_records_where_the_type_came_from() {
    let mut session = session_with(SALES, Some(StaticModel::replying("Try a scatter plot.")));

    let answer = session.ask("sales versus units as a bar chart");

    let chart = answer
        .intents
        .iter()
        .find(|intent| intent.kind == IntentKind::ScatterPlot)
        .expect("chart intent");
    assert_eq!(chart.chart_source, Some(ChartSource::Suggestion));
}

#[test]
fn blank_query_gets_a_prompt_message() {
    let mut session = session_with(SALES, None);

    let answer = session.ask("  \t ");

    assert!(answer.intents.is_empty());
    assert_eq!(answer.failures().collect::<Vec<_>>(), vec![&QueryError::EmptyQuery]);
}
