use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which naming grammar a series key matched.
///
/// Variant order matches the lexical order of the display tags, which is
/// the order the dashboard lists results in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ResultType {
    #[serde(rename = "Input time series")]
    Input,
    #[serde(rename = "Intermediate input time series")]
    Intermediate,
    #[serde(rename = "Output time series")]
    Output,
}

impl ResultType {
    pub fn label(self) -> &'static str {
        match self {
            ResultType::Input => "Input time series",
            ResultType::Intermediate => "Intermediate input time series",
            ResultType::Output => "Output time series",
        }
    }
}

/// Where an intermediate input series takes its values from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Timeseries,
    Model,
}

/// One dated observation. Dates are opaque ISO strings as stored in the
/// results snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// One classified series from a results snapshot. Only `id` and `values`
/// are guaranteed; the remaining fields depend on `result_type`:
/// `model_name` for output and intermediate series, `source_type` and
/// `source_model_name` for intermediate series only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub id: String,
    pub values: Vec<SeriesPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<ResultType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_model_name: Option<String>,
}

impl TimeSeries {
    pub fn unclassified(id: &str, values: Vec<SeriesPoint>) -> Self {
        TimeSeries {
            id: id.to_string(),
            values,
            result_type: None,
            series_name: None,
            author: None,
            model_name: None,
            source_type: None,
            source_model_name: None,
        }
    }
}

/// A results snapshot as persisted: series key -> date -> value. The
/// B-tree keeps ISO date keys sorted ascending.
pub type ResultsSnapshot = BTreeMap<String, BTreeMap<String, f64>>;

/// One declared input series of a catalog model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSeries {
    pub series_name_system: String,
    pub series_name_user: String,
}

/// One simulation model as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub model_system_name: String,
    pub model_name_user: String,
    pub author: String,
    pub inputs: BTreeMap<String, InputSeries>,
}

/// The external model catalog, read-only per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog {
    pub models: Vec<ModelRecord>,
}

impl ModelCatalog {
    pub fn has_model(&self, id: &str) -> bool {
        self.models.iter().any(|m| m.model_system_name == id)
    }

    pub fn has_input(&self, id: &str) -> bool {
        self.models.iter().any(|m| m.inputs.contains_key(id))
    }

    /// Selection choices for model pickers: (id, "id:label").
    pub fn model_choices(&self) -> Vec<(String, String)> {
        self.models
            .iter()
            .map(|m| {
                (
                    m.model_system_name.clone(),
                    format!("{}:{}", m.model_system_name, m.model_name_user),
                )
            })
            .collect()
    }

    /// Selection choices for input-series pickers across all models,
    /// deduplicated by series id in first-seen order.
    pub fn input_choices(&self) -> Vec<(String, String)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut choices = Vec::new();
        for model in &self.models {
            for (id, input) in &model.inputs {
                if seen.contains(&id.as_str()) {
                    continue;
                }
                seen.push(id);
                choices.push((id.clone(), format!("{}:{}", id, input.series_name_user)));
            }
        }
        choices
    }
}
