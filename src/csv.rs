use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ParseError;
use crate::wizard::{CardField, Command, Event, WizardState};
use crate::Amount;

/// Errors that can occur when reading a session script
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing value")]
    MissingValue { line: usize, action: String },

    #[error("line {line}: {action}: {reason}")]
    InvalidValue {
        line: usize,
        action: String,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    action: String,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    step: String,
    id: String,
    method: String,
    currency: String,
    network: String,
    amount: String,
    amount_in_cere: String,
    status: String,
    timestamp: String,
}

/// Read wizard commands from a csv session script with `action,value` rows
pub fn read_session(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Command, CsvError> {
    let action = row.action.to_ascii_lowercase();
    let value = || {
        row.value.clone().ok_or_else(|| CsvError::MissingValue {
            line,
            action: action.clone(),
        })
    };

    let event = match action.as_str() {
        "method" => Event::SelectMethod(parse_value(line, &action, value()?)?),
        "currency" => Event::SetCurrency(parse_value(line, &action, value()?)?),
        "network" => Event::SelectNetwork(parse_value(line, &action, value()?)?),
        "amount" => Event::SetAmount(parse_amount(line, value()?)?),
        "card_name" => Event::EditCard(CardField::Name, value()?),
        "card_number" => Event::EditCard(CardField::Number, value()?),
        "card_expiry" => Event::EditCard(CardField::Expiry, value()?),
        "card_cvc" => Event::EditCard(CardField::Cvc, value()?),
        "continue" => Event::Continue,
        "back" => Event::Back,
        "submit" => Event::SubmitDetails,
        "confirm" => Event::Confirm,
        "dismiss" => Event::Dismiss,
        "history" => Event::ViewHistory,
        "cancel" => Event::Cancel,
        "wait" => return Ok(Command::AwaitSettlement),
        _ => {
            return Err(CsvError::UnrecognizedAction {
                line,
                action: row.action,
            });
        }
    };
    Ok(Command::Apply(event))
}

fn parse_value<T: FromStr<Err = ParseError>>(
    line: usize,
    action: &str,
    raw: String,
) -> Result<T, CsvError> {
    raw.parse().map_err(|e: ParseError| CsvError::InvalidValue {
        line,
        action: action.to_string(),
        reason: e.to_string(),
    })
}

fn parse_amount(line: usize, raw: String) -> Result<Amount, CsvError> {
    let invalid = |reason: String| CsvError::InvalidValue {
        line,
        action: "amount".to_string(),
        reason,
    };
    let number = raw
        .parse::<f64>()
        .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
    Amount::try_from_float(number).map_err(|e| invalid(e.to_string()))
}

/// Write the wizard outcome to stdout as one csv row
pub fn write_summary(state: &WizardState) -> Result<(), csv::Error> {
    let stdout = io::stdout();
    write_summary_to(stdout.lock(), state)
}

pub fn write_summary_to(writer: impl io::Write, state: &WizardState) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let row = match state.transaction() {
        Some(tx) => OutputRow {
            step: state.step().to_string(),
            id: tx.id().to_string(),
            method: tx.method().to_string(),
            currency: tx.currency().to_string(),
            network: tx.network().map(|n| n.to_string()).unwrap_or_default(),
            amount: tx.amount().to_string(),
            amount_in_cere: tx.amount_in_cere().to_string(),
            status: tx.status().to_string(),
            timestamp: tx.timestamp().to_rfc3339(),
        },
        None => OutputRow {
            step: state.step().to_string(),
            id: String::new(),
            method: state.method().to_string(),
            currency: state.currency().to_string(),
            network: String::new(),
            amount: state.amount().to_string(),
            amount_in_cere: String::new(),
            status: String::new(),
            timestamp: String::new(),
        },
    };

    writer.serialize(&row)?;
    writer.flush()?;
    Ok(())
}
