use super::error::ClassifyError;
use super::types::{ResultType, ResultsSnapshot, SeriesPoint, SourceType, TimeSeries};

// The three series-key naming conventions, e.g.:
//   input:        "oil_Brent: macbook:timeseries"
//   output:       "incomePerDay_exxon, macbook, (output, Exxon_4)"
//   intermediate: "oil, Exxon_4, macbook, input, source_type: timeseries, oil, macbook"
const INPUT_SUFFIX: &str = ":timeseries";
const OUTPUT_MARKER: &str = "(output,";
const INTERMEDIATE_MARKER: &str = "input,source_type:";

/// Classifies one series key against the three naming grammars and builds
/// its descriptor. Every grammar is tested unconditionally; if more than
/// one matches, later grammars overwrite the fields of earlier ones. A key
/// matching no grammar yields a descriptor with only `id` and `values`.
pub fn classify(key: &str, values: Vec<SeriesPoint>) -> Result<TimeSeries, ClassifyError> {
    let mut ts = TimeSeries::unclassified(key, values);

    if key.ends_with(INPUT_SUFFIX) {
        let tokens: Vec<&str> = key.split(':').map(str::trim).collect();
        let [series_name, author, ..] = tokens[..] else {
            return Err(malformed(key, "input", 2, tokens.len()));
        };
        ts.result_type = Some(ResultType::Input);
        ts.series_name = Some(series_name.to_string());
        ts.author = Some(author.to_string());
    }

    if key.ends_with(')') && key.contains(OUTPUT_MARKER) {
        let stripped: String = key.chars().filter(|c| !matches!(c, '(' | ')')).collect();
        let tokens: Vec<&str> = stripped.split(',').map(str::trim).collect();
        let [series_name, author, _output_tag, model_name, ..] = tokens[..] else {
            return Err(malformed(key, "output", 4, tokens.len()));
        };
        ts.result_type = Some(ResultType::Output);
        ts.series_name = Some(series_name.to_string());
        ts.author = Some(author.to_string());
        ts.model_name = Some(model_name.to_string());
    }

    if let Some(marker_at) = key.find(INTERMEDIATE_MARKER) {
        let tokens: Vec<&str> = key.split(',').map(str::trim).collect();
        let [series_name, model_name, author, _input_tag, source @ ..] = &tokens[..] else {
            return Err(malformed(key, "intermediate", 4, tokens.len()));
        };
        ts.result_type = Some(ResultType::Intermediate);
        ts.series_name = Some(series_name.to_string());
        ts.author = Some(author.to_string());
        ts.model_name = Some(model_name.to_string());

        // Source keys are written both as "source_type:output" and
        // "source_type: output"; leading whitespace after the colon is not
        // significant.
        let after_marker = &key[marker_at + INTERMEDIATE_MARKER.len()..];
        if after_marker.trim_start().starts_with("output") {
            let [_source_tag, source_model_name, ..] = source[..] else {
                return Err(malformed(key, "intermediate", 6, tokens.len()));
            };
            ts.source_type = Some(SourceType::Model);
            ts.source_model_name = Some(source_model_name.to_string());
        } else {
            ts.source_type = Some(SourceType::Timeseries);
        }
    }

    Ok(ts)
}

/// Classifies every key in a results snapshot. Values carry over in date
/// order; descriptors are sorted by result type with unclassified series
/// first, then the lexical order of the display tags.
pub fn classify_snapshot(snapshot: &ResultsSnapshot) -> Result<Vec<TimeSeries>, ClassifyError> {
    let mut series = Vec::with_capacity(snapshot.len());
    for (key, values) in snapshot {
        let points = values
            .iter()
            .map(|(date, value)| SeriesPoint {
                date: date.clone(),
                value: *value,
            })
            .collect();
        series.push(classify(key, points)?);
    }
    series.sort_by(|a, b| a.result_type.cmp(&b.result_type));
    Ok(series)
}

fn malformed(key: &str, grammar: &'static str, expected: usize, found: usize) -> ClassifyError {
    ClassifyError::MalformedKey {
        key: key.to_string(),
        grammar,
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn classify_key(key: &str) -> TimeSeries {
        classify(key, Vec::new()).expect("key must classify")
    }

    #[test]
    fn input_grammar_extracts_name_and_author() {
        let ts = classify_key("oil_Brent: macbook:timeseries");
        assert_eq!(ts.result_type, Some(ResultType::Input));
        assert_eq!(ts.series_name.as_deref(), Some("oil_Brent"));
        assert_eq!(ts.author.as_deref(), Some("macbook"));
        assert_eq!(ts.model_name, None);
        assert_eq!(ts.source_type, None);
    }

    #[test]
    fn input_grammar_ignores_trailing_tokens() {
        let ts = classify_key("G & A_Exxon_sovcombank: macbook:extra:timeseries");
        assert_eq!(ts.result_type, Some(ResultType::Input));
        assert_eq!(ts.series_name.as_deref(), Some("G & A_Exxon_sovcombank"));
        assert_eq!(ts.author.as_deref(), Some("macbook"));
    }

    #[test]
    fn output_grammar_extracts_model_from_parenthesized_suffix() {
        let ts = classify_key("incomePerDay_exxon, macbook, (output, Exxon_4)");
        assert_eq!(ts.result_type, Some(ResultType::Output));
        assert_eq!(ts.series_name.as_deref(), Some("incomePerDay_exxon"));
        assert_eq!(ts.author.as_deref(), Some("macbook"));
        assert_eq!(ts.model_name.as_deref(), Some("Exxon_4"));
        assert_eq!(ts.source_type, None);
    }

    #[test]
    fn output_grammar_with_too_few_tokens_is_malformed() {
        let err = classify("foo,(output,)", Vec::new()).expect_err("must be malformed");
        assert!(matches!(
            err,
            ClassifyError::MalformedKey {
                grammar: "output",
                expected: 4,
                ..
            }
        ));
    }

    #[test]
    fn intermediate_grammar_with_model_source() {
        let ts = classify_key(
            "gasoline_exxon,Goodyear,macbook,input,source_type: output,Exxon_4,gasoline_exxon,macbook",
        );
        assert_eq!(ts.result_type, Some(ResultType::Intermediate));
        assert_eq!(ts.series_name.as_deref(), Some("gasoline_exxon"));
        assert_eq!(ts.model_name.as_deref(), Some("Goodyear"));
        assert_eq!(ts.author.as_deref(), Some("macbook"));
        assert_eq!(ts.source_type, Some(SourceType::Model));
        assert_eq!(ts.source_model_name.as_deref(), Some("Exxon_4"));
    }

    #[test]
    fn intermediate_grammar_with_timeseries_source() {
        let ts =
            classify_key("oil, Exxon_4, macbook, input,source_type: timeseries, oil, macbook");
        assert_eq!(ts.result_type, Some(ResultType::Intermediate));
        assert_eq!(ts.series_name.as_deref(), Some("oil"));
        assert_eq!(ts.model_name.as_deref(), Some("Exxon_4"));
        assert_eq!(ts.author.as_deref(), Some("macbook"));
        assert_eq!(ts.source_type, Some(SourceType::Timeseries));
        assert_eq!(ts.source_model_name, None);
    }

    #[test]
    fn intermediate_grammar_spaceless_output_marker() {
        let ts = classify_key(
            "gasoline_exxon,Goodyear,macbook,input,source_type:output,Exxon_4,gasoline_exxon,macbook",
        );
        assert_eq!(ts.source_type, Some(SourceType::Model));
        assert_eq!(ts.source_model_name.as_deref(), Some("Exxon_4"));
    }

    #[test]
    fn intermediate_grammar_with_too_few_tokens_is_malformed() {
        let err = classify("a,input,source_type: x", Vec::new()).expect_err("must be malformed");
        assert!(matches!(
            err,
            ClassifyError::MalformedKey {
                grammar: "intermediate",
                ..
            }
        ));
    }

    #[test]
    fn unmatched_key_keeps_only_id_and_values() {
        let points = vec![SeriesPoint {
            date: "2020-01-01".to_string(),
            value: 1.5,
        }];
        let ts = classify("just a label", points.clone()).expect("must classify");
        assert_eq!(ts.id, "just a label");
        assert_eq!(ts.values, points);
        assert_eq!(ts.result_type, None);
        assert_eq!(ts.series_name, None);
        assert_eq!(ts.author, None);
        assert_eq!(ts.model_name, None);
        assert_eq!(ts.source_type, None);
        assert_eq!(ts.source_model_name, None);
    }

    #[test]
    fn later_grammars_overwrite_earlier_matches() {
        // Ends in ":timeseries" and carries the intermediate marker, so
        // both grammars run; the intermediate fields must win.
        let ts = classify_key("a,b,c,input,source_type: timeseries,a: x:timeseries");
        assert_eq!(ts.result_type, Some(ResultType::Intermediate));
        assert_eq!(ts.series_name.as_deref(), Some("a"));
        assert_eq!(ts.model_name.as_deref(), Some("b"));
        assert_eq!(ts.author.as_deref(), Some("c"));
    }

    #[test]
    fn empty_snapshot_classifies_to_empty_list() {
        let snapshot = ResultsSnapshot::new();
        assert_eq!(classify_snapshot(&snapshot).expect("must classify"), vec![]);
    }

    #[test]
    fn snapshot_sorts_by_result_type_with_unclassified_first() {
        let mut snapshot = ResultsSnapshot::new();
        for key in [
            "incomePerDay_exxon, macbook, (output, Exxon_4)",
            "oil_Brent: macbook:timeseries",
            "unlabelled scratch series",
            "oil, Exxon_4, macbook, input,source_type: timeseries, oil, macbook",
        ] {
            snapshot.insert(key.to_string(), BTreeMap::new());
        }

        let series = classify_snapshot(&snapshot).expect("must classify");
        let types: Vec<Option<ResultType>> = series.iter().map(|ts| ts.result_type).collect();
        assert_eq!(
            types,
            vec![
                None,
                Some(ResultType::Input),
                Some(ResultType::Intermediate),
                Some(ResultType::Output),
            ]
        );
    }

    #[test]
    fn snapshot_values_arrive_in_date_order() {
        let mut values = BTreeMap::new();
        values.insert("2020-03-01".to_string(), 3.0);
        values.insert("2020-01-01".to_string(), 1.0);
        values.insert("2020-02-01".to_string(), 2.0);
        let mut snapshot = ResultsSnapshot::new();
        snapshot.insert("oil_Brent: macbook:timeseries".to_string(), values);

        let series = classify_snapshot(&snapshot).expect("must classify");
        let dates: Vec<&str> = series[0].values.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2020-01-01", "2020-02-01", "2020-03-01"]);
    }
}
