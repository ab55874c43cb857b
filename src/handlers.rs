use crate::aggregation::{AveragingWindow, Extremum, extremum};
use crate::errors::AppError;
use crate::models::{
    AxisRequest, EntryKey, EntryRequest, Person, PersonDescriptor, ReminderResponse,
    ReminderToggleRequest, SummaryResponse, WeightInput, WindowRequest,
};
use crate::state::AppState;
use crate::stats::build_summary;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

pub async fn index() -> Html<String> {
    Html(render_index(&today().to_string()))
}

pub async fn list_people() -> Json<Vec<PersonDescriptor>> {
    Json(Person::ALL.into_iter().map(Person::descriptor).collect())
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(person): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    Ok(Json(summary_for(&state, person).await))
}

pub async fn save_entry(
    State(state): State<AppState>,
    Path(person): Path<String>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    apply_entry(&state, person, &payload).await?;
    Ok(Json(summary_for(&state, person).await))
}

pub async fn save_entry_form(
    State(state): State<AppState>,
    Path(person): Path<String>,
    Form(payload): Form<EntryRequest>,
) -> Result<Redirect, AppError> {
    let person = parse_person(&person)?;
    apply_entry(&state, person, &payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((person, date)): Path<(String, String)>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    let date = parse_date(&date)
        .ok_or_else(|| AppError::not_found(format!("no entry for {person} on {date}")))?;
    let key = EntryKey::new(person, date);

    let mut data = state.data.lock().await;
    if data.get(key).is_none() {
        return Err(AppError::not_found(format!("no entry for {person} on {date}")));
    }

    let mut updated = data.clone();
    updated.delete(key);
    persist_data(&state.data_path, &updated).await?;
    *data = updated;
    drop(data);

    info!(%person, %date, "weight entry deleted");
    Ok(Json(summary_for(&state, person).await))
}

pub async fn set_window(
    State(state): State<AppState>,
    Path(person): Path<String>,
    Json(payload): Json<WindowRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    match AveragingWindow::new(payload.days) {
        Some(window) => {
            state.update_view(person, |view| view.window = window).await;
        }
        None => debug!(%person, days = payload.days, "ignoring unsupported averaging window"),
    }
    Ok(Json(summary_for(&state, person).await))
}

pub async fn set_axis(
    State(state): State<AppState>,
    Path(person): Path<String>,
    Json(payload): Json<AxisRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    let (Some(requested_min), Some(requested_max)) =
        (parse_number(&payload.min), parse_number(&payload.max))
    else {
        debug!(%person, min = %payload.min, max = %payload.max, "ignoring malformed axis range");
        return Ok(Json(summary_for(&state, person).await));
    };

    let series = state.data.lock().await.series(person);
    let data_min = extremum(&series, Extremum::Min).map(|point| point.weight);
    let data_max = extremum(&series, Extremum::Max).map(|point| point.weight);

    let mut applied = false;
    state
        .update_view(person, |view| {
            applied = view
                .axis
                .apply(requested_min, requested_max, data_min, data_max);
        })
        .await;
    if !applied {
        debug!(%person, requested_min, requested_max, "axis range rejected");
    }

    Ok(Json(summary_for(&state, person).await))
}

pub async fn reset_axis(
    State(state): State<AppState>,
    Path(person): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = parse_person(&person)?;
    state.update_view(person, |view| view.axis.reset()).await;
    Ok(Json(summary_for(&state, person).await))
}

pub async fn get_reminder(State(state): State<AppState>) -> Json<ReminderResponse> {
    Json(state.reminders.status().await)
}

pub async fn toggle_reminder(
    State(state): State<AppState>,
    Json(payload): Json<ReminderToggleRequest>,
) -> Result<Json<ReminderResponse>, AppError> {
    if payload.enabled {
        state.reminders.enable().await?;
    } else {
        state.reminders.cancel_daily().await;
        info!("daily reminder turned off");
    }
    Ok(Json(state.reminders.status().await))
}

/// Upserts the entry described by `payload`. Unparsable weight or date text
/// leaves the store untouched.
async fn apply_entry(
    state: &AppState,
    person: Person,
    payload: &EntryRequest,
) -> Result<(), AppError> {
    let Some(weight) = parse_weight(&payload.weight) else {
        debug!(%person, weight = %payload.weight, "ignoring invalid weight");
        return Ok(());
    };
    let date = match payload.date.as_deref().map(str::trim) {
        None | Some("") => today(),
        Some(text) => match parse_date(text) {
            Some(date) => date,
            None => {
                debug!(%person, date = text, "ignoring invalid date");
                return Ok(());
            }
        },
    };

    let mut data = state.data.lock().await;
    let mut updated = data.clone();
    let previous = updated.upsert(person, date, weight)?;
    persist_data(&state.data_path, &updated).await?;
    *data = updated;

    info!(%person, %date, weight, replaced = previous.is_some(), "weight saved");
    Ok(())
}

async fn summary_for(state: &AppState, person: Person) -> SummaryResponse {
    let series = state.data.lock().await.series(person);
    let view = state.view(person).await;
    build_summary(person, &series, view)
}

fn parse_person(id: &str) -> Result<Person, AppError> {
    id.parse()
        .map_err(|_| AppError::not_found(format!("unknown person '{id}'")))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_weight(input: &WeightInput) -> Option<f64> {
    let weight = match input {
        WeightInput::Number(value) => Some(*value).filter(|value| value.is_finite()),
        WeightInput::Text(text) => parse_number(text),
    };
    weight.filter(|weight| *weight > 0.0)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::{
        LocalNotificationCenter, PermissionDecision, ReminderScheduler, ReminderTime,
    };
    use crate::storage::WeightLog;
    use axum::http::StatusCode;
    use std::sync::Arc;

    /// State whose data file sits in a directory that does not exist.
    fn unwritable_state(data: WeightLog) -> AppState {
        let mut data_path = std::env::temp_dir();
        data_path.push(format!("weight_tracker_absent_{}", std::process::id()));
        data_path.push("weights.json");
        let reminders = ReminderScheduler::new(
            Arc::new(LocalNotificationCenter::new(PermissionDecision::Denied)),
            ReminderTime::default(),
        );
        AppState::new(data_path, data, reminders)
    }

    fn text(weight: &str) -> WeightInput {
        WeightInput::Text(weight.to_string())
    }

    #[test]
    fn weight_text_must_be_positive_number() {
        assert_eq!(parse_weight(&text(" 70.5 ")), Some(70.5));
        assert_eq!(parse_weight(&text("abc")), None);
        assert_eq!(parse_weight(&text("-4")), None);
        assert_eq!(parse_weight(&text("0")), None);
        assert_eq!(parse_weight(&text("inf")), None);
        assert_eq!(parse_weight(&text("NaN")), None);
    }

    #[test]
    fn numeric_weight_must_be_positive() {
        assert_eq!(parse_weight(&WeightInput::Number(70.5)), Some(70.5));
        assert_eq!(parse_weight(&WeightInput::Number(0.0)), None);
        assert_eq!(parse_weight(&WeightInput::Number(-1.5)), None);
    }

    #[test]
    fn dates_are_iso_calendar_days() {
        assert_eq!(parse_date("2026-02-28"), NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("28/02/2026"), None);
    }

    #[tokio::test]
    async fn failed_save_leaves_log_unchanged() {
        let state = unwritable_state(WeightLog::default());
        let request = EntryRequest {
            date: Some("2026-03-01".to_string()),
            weight: text("70.5"),
        };

        let err = save_entry(State(state.clone()), Path("me".to_string()), Json(request))
            .await
            .err()
            .expect("write into a missing directory fails");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let Json(summary) = get_summary(State(state), Path("me".to_string()))
            .await
            .ok()
            .expect("summary for a known person");
        assert!(summary.series.is_empty());
        assert_eq!(summary.latest, None);
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut log = WeightLog::default();
        log.upsert(Person::Me, day, 70.5).unwrap();
        let state = unwritable_state(log);

        let path = Path(("me".to_string(), "2026-03-01".to_string()));
        let err = delete_entry(State(state.clone()), path)
            .await
            .err()
            .expect("write into a missing directory fails");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let kept = state.data.lock().await.get(EntryKey::new(Person::Me, day));
        assert_eq!(kept, Some(70.5));
    }

    #[test]
    fn unknown_person_is_not_found() {
        let err = parse_person("stranger").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(parse_person("me").unwrap(), Person::Me);
    }
}
