use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::FormError;
use super::types::ModelCatalog;

/// One configuration instruction for a simulation run. The `command` tag
/// is the discriminator persisted in the command-list snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RunCommand {
    StartDay {
        start_day: String,
    },
    NumberOfDays {
        number_of_days: u32,
    },
    ExeModels {
        exe_models: Vec<String>,
    },
    ChangeInputSeriesOneModel {
        model: String,
        input_initial: String,
        input_final: String,
    },
    ChangeInputSeriesAllModels {
        input_initial: String,
        input_final: String,
    },
    ChangeTimeseriesValueSeveralDays {
        input: String,
        start_day: String,
        number_of_days: u32,
        value: f64,
    },
    ChangeTimeseriesValueSeveralDaysAddDelta {
        input: String,
        start_day: String,
        number_of_days: u32,
        delta: f64,
    },
}

/// Whether extraction checks referenced model/input ids against the
/// catalog. Relaxed is the default: the dashboard historically accepted
/// free-form ids with pre-validation switched off.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Strict,
    #[default]
    Relaxed,
}

/// Substitute one model's input series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSwapEntry {
    pub model: Option<String>,
    pub input_initial: Option<String>,
    pub input_final: Option<String>,
}

impl ModelSwapEntry {
    fn is_empty(&self) -> bool {
        is_blank(&self.model) && is_blank(&self.input_initial) && is_blank(&self.input_final)
    }
}

/// Substitute an input series across every model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSwapEntry {
    pub input_initial: Option<String>,
    pub input_final: Option<String>,
}

impl GlobalSwapEntry {
    fn is_empty(&self) -> bool {
        is_blank(&self.input_initial) && is_blank(&self.input_final)
    }
}

/// Overwrite an input series with a fixed value for a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueOverrideEntry {
    pub input: Option<String>,
    pub start_day: Option<String>,
    pub number_of_days: Option<u32>,
    pub value: Option<f64>,
}

impl ValueOverrideEntry {
    fn is_empty(&self) -> bool {
        is_blank(&self.input)
            && is_blank(&self.start_day)
            && self.number_of_days.is_none()
            && self.value.is_none()
    }
}

/// Shift an input series by a delta for a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaOverrideEntry {
    pub input: Option<String>,
    pub start_day: Option<String>,
    pub number_of_days: Option<u32>,
    pub delta: Option<f64>,
}

impl DeltaOverrideEntry {
    fn is_empty(&self) -> bool {
        is_blank(&self.input)
            && is_blank(&self.start_day)
            && self.number_of_days.is_none()
            && self.delta.is_none()
    }
}

/// The editable run-configuration form. Simple fields are optional so an
/// untouched form extracts to an empty command list; the four entry lists
/// mirror the compound command kinds and grow on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormState {
    pub start_day: Option<NaiveDate>,
    pub number_of_days: Option<u32>,
    pub exe_models: Option<Vec<String>>,
    pub series_swaps_one_model: Vec<ModelSwapEntry>,
    pub series_swaps_all_models: Vec<GlobalSwapEntry>,
    pub value_overrides: Vec<ValueOverrideEntry>,
    pub delta_overrides: Vec<DeltaOverrideEntry>,
}

/// Projects a stored command list into form defaults. Entry lists grow to
/// the number of matching commands but are never shrunk; missing or
/// unparseable primitive values are replaced by safe defaults instead of
/// failing.
pub fn apply_defaults(commands: &[RunCommand], form: &mut FormState) {
    let mut one_model = 0usize;
    let mut all_models = 0usize;
    let mut values = 0usize;
    let mut deltas = 0usize;

    for command in commands {
        match command {
            RunCommand::StartDay { start_day } => {
                form.start_day = Some(parse_day_lenient(start_day));
            }
            RunCommand::NumberOfDays { number_of_days } => {
                form.number_of_days = Some(*number_of_days);
            }
            RunCommand::ExeModels { exe_models } => {
                form.exe_models = Some(exe_models.clone());
            }
            RunCommand::ChangeInputSeriesOneModel {
                model,
                input_initial,
                input_final,
            } => {
                let entry = entry_at(&mut form.series_swaps_one_model, one_model);
                entry.model = Some(model.clone());
                entry.input_initial = Some(input_initial.clone());
                entry.input_final = Some(input_final.clone());
                one_model += 1;
            }
            RunCommand::ChangeInputSeriesAllModels {
                input_initial,
                input_final,
            } => {
                let entry = entry_at(&mut form.series_swaps_all_models, all_models);
                entry.input_initial = Some(input_initial.clone());
                entry.input_final = Some(input_final.clone());
                all_models += 1;
            }
            RunCommand::ChangeTimeseriesValueSeveralDays {
                input,
                start_day,
                number_of_days,
                value,
            } => {
                let entry = entry_at(&mut form.value_overrides, values);
                entry.input = Some(input.clone());
                entry.start_day = Some(parse_day_lenient(start_day).to_string());
                entry.number_of_days = Some(*number_of_days);
                entry.value = Some(*value);
                values += 1;
            }
            RunCommand::ChangeTimeseriesValueSeveralDaysAddDelta {
                input,
                start_day,
                number_of_days,
                delta,
            } => {
                let entry = entry_at(&mut form.delta_overrides, deltas);
                entry.input = Some(input.clone());
                entry.start_day = Some(parse_day_lenient(start_day).to_string());
                entry.number_of_days = Some(*number_of_days);
                entry.delta = Some(*delta);
                deltas += 1;
            }
        }
    }
}

/// Walks the form in declaration order and emits one command per
/// populated field or sub-entry. Fully empty sub-entries are skipped; a
/// partially filled one is an error naming the offending field. Under
/// strict validation every referenced model/input id must exist in the
/// catalog.
pub fn extract_commands(
    form: &FormState,
    catalog: &ModelCatalog,
    validation: ValidationMode,
) -> Result<Vec<RunCommand>, FormError> {
    let mut commands = Vec::new();

    if let Some(day) = form.start_day {
        commands.push(RunCommand::StartDay {
            start_day: day.to_string(),
        });
    }

    if let Some(days) = form.number_of_days {
        if days == 0 {
            return Err(FormError::NonPositiveDays {
                field: "numberOfDays",
            });
        }
        commands.push(RunCommand::NumberOfDays {
            number_of_days: days,
        });
    }

    if let Some(models) = &form.exe_models {
        for id in models {
            check_model(catalog, validation, "exeModels", id)?;
        }
        commands.push(RunCommand::ExeModels {
            exe_models: models.clone(),
        });
    }

    for (index, entry) in form.series_swaps_one_model.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        let list = "seriesSwapsOneModel";
        let model = require(list, index, "model", &entry.model)?;
        let input_initial = require(list, index, "inputInitial", &entry.input_initial)?;
        let input_final = require(list, index, "inputFinal", &entry.input_final)?;
        check_model(catalog, validation, list, &model)?;
        check_input(catalog, validation, list, &input_initial)?;
        check_input(catalog, validation, list, &input_final)?;
        commands.push(RunCommand::ChangeInputSeriesOneModel {
            model,
            input_initial,
            input_final,
        });
    }

    for (index, entry) in form.series_swaps_all_models.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        let list = "seriesSwapsAllModels";
        let input_initial = require(list, index, "inputInitial", &entry.input_initial)?;
        let input_final = require(list, index, "inputFinal", &entry.input_final)?;
        check_input(catalog, validation, list, &input_initial)?;
        check_input(catalog, validation, list, &input_final)?;
        commands.push(RunCommand::ChangeInputSeriesAllModels {
            input_initial,
            input_final,
        });
    }

    for (index, entry) in form.value_overrides.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        let list = "valueOverrides";
        let input = require(list, index, "input", &entry.input)?;
        let start_day = require_day(list, index, &entry.start_day)?;
        let number_of_days = require_days(list, index, entry.number_of_days)?;
        let value = require_number(list, index, "value", entry.value)?;
        check_input(catalog, validation, list, &input)?;
        commands.push(RunCommand::ChangeTimeseriesValueSeveralDays {
            input,
            start_day,
            number_of_days,
            value,
        });
    }

    for (index, entry) in form.delta_overrides.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        let list = "deltaOverrides";
        let input = require(list, index, "input", &entry.input)?;
        let start_day = require_day(list, index, &entry.start_day)?;
        let number_of_days = require_days(list, index, entry.number_of_days)?;
        let delta = require_number(list, index, "delta", entry.delta)?;
        check_input(catalog, validation, list, &input)?;
        commands.push(RunCommand::ChangeTimeseriesValueSeveralDaysAddDelta {
            input,
            start_day,
            number_of_days,
            delta,
        });
    }

    Ok(commands)
}

/// Lenient date reading for stored defaults: blank or literal "None"
/// means today; otherwise only the first ten characters (`YYYY-MM-DD`)
/// are significant, silently dropping any time-of-day suffix.
fn parse_day_lenient(raw: &str) -> NaiveDate {
    let raw = raw.trim();
    if raw.is_empty() || raw == "None" {
        return Local::now().date_naive();
    }
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").unwrap_or_else(|_| Local::now().date_naive())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn entry_at<T: Default>(list: &mut Vec<T>, index: usize) -> &mut T {
    while list.len() <= index {
        list.push(T::default());
    }
    &mut list[index]
}

fn require(
    list: &'static str,
    index: usize,
    field: &'static str,
    value: &Option<String>,
) -> Result<String, FormError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(FormError::MissingField { list, index, field }),
    }
}

fn require_day(
    list: &'static str,
    index: usize,
    value: &Option<String>,
) -> Result<String, FormError> {
    let raw = require(list, index, "startDay", value)?;
    let head = raw.get(..10).unwrap_or(&raw);
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(day) => Ok(day.to_string()),
        Err(_) => Err(FormError::InvalidDate {
            list,
            index,
            field: "startDay",
            raw,
        }),
    }
}

fn require_days(list: &'static str, index: usize, value: Option<u32>) -> Result<u32, FormError> {
    match value {
        Some(days) if days > 0 => Ok(days),
        Some(_) => Err(FormError::NonPositiveDays {
            field: "numberOfDays",
        }),
        None => Err(FormError::MissingField {
            list,
            index,
            field: "numberOfDays",
        }),
    }
}

fn require_number(
    list: &'static str,
    index: usize,
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, FormError> {
    value.ok_or(FormError::MissingField { list, index, field })
}

fn check_model(
    catalog: &ModelCatalog,
    validation: ValidationMode,
    field: &'static str,
    id: &str,
) -> Result<(), FormError> {
    if validation == ValidationMode::Strict && !catalog.has_model(id) {
        return Err(FormError::UnknownModel {
            field,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn check_input(
    catalog: &ModelCatalog,
    validation: ValidationMode,
    field: &'static str,
    id: &str,
) -> Result<(), FormError> {
    if validation == ValidationMode::Strict && !catalog.has_input(id) {
        return Err(FormError::UnknownInput {
            field,
            id: id.to_string(),
        });
    }
    Ok(())
}
