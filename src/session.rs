//! One interactive session: the current upload plus everything needed to
//! answer a query against it.
//!
//! [`Session::ask`] never fails. Each problem is scoped to the query that
//! caused it and comes back as an [`Output::Failure`] next to whatever else
//! the query produced.

use std::path::Path;

use anyhow::Result;
use encoding_rs::Encoding;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    chart::ChartSpec,
    dataset::Dataset,
    error::QueryError,
    executor::{self, Direction, Extreme, ExtremeValue, RankedRows},
    intent::{IntentKind, IntentResolver, QueryIntent},
    keywords::KeywordTable,
    matcher::{self, Arity},
    suggest::{SuggestionModel, build_prompt},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum Output {
    /// Text produced by the interpretation model.
    Interpretation { text: String },
    Value(ExtremeValue),
    Rows(RankedRows),
    Chart(ChartSpec),
    Failure {
        message: String,
        #[serde(skip)]
        error: QueryError,
    },
}

impl Output {
    fn failure(error: QueryError) -> Self {
        Output::Failure {
            message: error.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub query: String,
    pub intents: Vec<QueryIntent>,
    pub outputs: Vec<Output>,
}

impl Answer {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            intents: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.outputs.iter().filter_map(|output| match output {
            Output::Chart(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryError> {
        self.outputs.iter().filter_map(|output| match output {
            Output::Failure { error, .. } => Some(error),
            _ => None,
        })
    }
}

pub struct Session<R: Rng = StdRng> {
    keywords: KeywordTable,
    model: Option<Box<dyn SuggestionModel>>,
    dataset: Option<Dataset>,
    rng: R,
}

impl Session<StdRng> {
    /// Session with a seeded RNG when `seed` is given, entropy otherwise.
    pub fn with_seed(
        keywords: KeywordTable,
        model: Option<Box<dyn SuggestionModel>>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(keywords, model, rng)
    }
}

impl<R: Rng> Session<R> {
    pub fn new(keywords: KeywordTable, model: Option<Box<dyn SuggestionModel>>, rng: R) -> Self {
        Self {
            keywords,
            model,
            dataset: None,
            rng,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Replaces the current dataset.
    pub fn upload(&mut self, dataset: Dataset) {
        if let Some(previous) = self.dataset.replace(dataset) {
            debug!("Discarded dataset from {}", previous.source());
        }
    }

    pub fn load_file(
        &mut self,
        path: &Path,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
    ) -> Result<&Dataset> {
        let dataset = Dataset::load(path, delimiter, encoding)?;
        if let Some(previous) = self.dataset.take() {
            debug!("Discarded dataset from {}", previous.source());
        }
        Ok(&*self.dataset.insert(dataset))
    }

    pub fn clear(&mut self) {
        self.dataset = None;
    }

    pub fn ask(&mut self, query: &str) -> Answer {
        let mut answer = Answer::new(query);
        let Some(dataset) = self.dataset.as_ref() else {
            answer.outputs.push(Output::failure(QueryError::NoDataset));
            return answer;
        };
        if query.trim().is_empty() {
            answer.outputs.push(Output::failure(QueryError::EmptyQuery));
            return answer;
        }
        info!("Answering query: {query}");

        let suggestion = match &self.model {
            Some(model) => {
                let prompt = build_prompt(dataset.column_names(), query);
                match model.generate(&prompt) {
                    Ok(text) => {
                        debug!("Model {} suggested: {text}", model.name());
                        answer
                            .outputs
                            .push(Output::Interpretation { text: text.clone() });
                        Some(text)
                    }
                    Err(err) => {
                        warn!("Interpretation model failed: {err:#}");
                        answer
                            .outputs
                            .push(Output::failure(QueryError::Suggestion(format!("{err:#}"))));
                        None
                    }
                }
            }
            None => None,
        };

        let resolver = IntentResolver::new(&self.keywords);
        let intents = resolver.classify(query, suggestion.as_deref());
        for mut intent in intents {
            let outcome = dispatch(dataset, query, &mut intent, &mut self.rng);
            answer.outputs.push(outcome.unwrap_or_else(Output::failure));
            answer.intents.push(intent);
        }
        answer
    }
}

/// Runs one intent. The resolved column names are recorded on the intent.
fn dispatch<R: Rng + ?Sized>(
    dataset: &Dataset,
    query: &str,
    intent: &mut QueryIntent,
    rng: &mut R,
) -> Result<Output, QueryError> {
    let columns = dataset.column_names();
    match intent.kind {
        IntentKind::HighestValue | IntentKind::LowestValue => {
            let column = single_column(query, columns, intent)?;
            let extreme = Extreme::try_from(intent.kind).map_err(|_| QueryError::UnknownIntent)?;
            executor::extreme_value(dataset, &column, extreme).map(Output::Value)
        }
        IntentKind::TopN | IntentKind::BottomN => {
            let n = intent.n.ok_or(QueryError::UnknownIntent)?;
            let column = single_column(query, columns, intent)?;
            let direction =
                Direction::try_from(intent.kind).map_err(|_| QueryError::UnknownIntent)?;
            executor::ranked_rows(dataset, &column, n, direction).map(Output::Rows)
        }
        IntentKind::Unknown => Err(QueryError::UnknownIntent),
        chart_kind => {
            let chart = chart_kind.chart().ok_or(QueryError::UnknownIntent)?;
            let resolved = matcher::match_columns(
                query,
                columns,
                Arity::from_count(chart.column_arity()),
                rng,
            )?;
            if resolved.is_empty() {
                return Err(QueryError::UnresolvedColumn {
                    operation: chart.label().to_string(),
                });
            }
            intent.columns = resolved.columns.clone();
            debug!(
                "{} (from {:?}) columns {:?} chosen by {:?}",
                chart, intent.chart_source, resolved.columns, resolved.source
            );
            executor::prepare_chart(dataset, chart, &resolved).map(Output::Chart)
        }
    }
}

fn single_column(
    query: &str,
    columns: &[String],
    intent: &mut QueryIntent,
) -> Result<String, QueryError> {
    let column = matcher::match_single(query, columns).ok_or_else(|| {
        QueryError::UnresolvedColumn {
            operation: intent.kind.describe().to_string(),
        }
    })?;
    intent.columns = vec![column.clone()];
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keywords::ChartType, suggest::StaticModel};

    fn session(model: Option<Box<dyn SuggestionModel>>) -> Session {
        let mut session = Session::with_seed(KeywordTable::default(), model, Some(11));
        let csv = "region,sales,units\nnorth,10,1\nsouth,30,3\neast,20,2\n";
        let dataset =
            Dataset::from_reader(csv.as_bytes(), b',', encoding_rs::UTF_8, "inline").unwrap();
        session.upload(dataset);
        session
    }

    #[test]
    fn no_dataset_is_an_informational_failure() {
        let mut session = Session::with_seed(KeywordTable::default(), None, Some(1));
        let answer = session.ask("highest sales");
        assert_eq!(answer.failures().collect::<Vec<_>>(), vec![&QueryError::NoDataset]);
    }

    #[test]
    fn model_failure_degrades_to_raw_query() {
        let mut session = session(Some(Box::new(StaticModel::failing("connection refused"))));
        let answer = session.ask("bar chart of region and sales");
        assert!(matches!(
            answer.failures().next(),
            Some(QueryError::Suggestion(_))
        ));
        let chart = answer.charts().next().expect("chart from raw query");
        assert_eq!(chart.kind, ChartType::BarChart);
    }

    #[test]
    fn model_suggestion_wins_over_query_keywords() {
        let mut session = session(Some(Box::new(StaticModel::replying(
            "A scatter plot shows the correlation best.",
        ))));
        let answer = session.ask("bar chart of sales and units");
        assert!(matches!(answer.outputs[0], Output::Interpretation { .. }));
        assert_eq!(answer.charts().next().unwrap().kind, ChartType::ScatterPlot);
    }

    #[test]
    fn unresolved_column_is_reported_not_raised() {
        let mut session = session(None);
        let answer = session.ask("what is the highest value?");
        assert_eq!(
            answer.failures().next(),
            Some(&QueryError::UnresolvedColumn {
                operation: "highest/lowest value".into()
            })
        );
    }

    #[test]
    fn blank_query_asks_for_input() {
        let mut session = session(None);
        let answer = session.ask("   ");
        assert!(answer.intents.is_empty());
        assert_eq!(answer.failures().collect::<Vec<_>>(), vec![&QueryError::EmptyQuery]);
    }
}
