//! Plain-text views of the session state.

use std::fmt::Write as _;

use caster_core::{Coordinates, LocationUnavailable, RequestState, Session, WeatherReport};
use serde_json::{Value, json};

pub const APP_NAME: &str = "AI Caster";
pub const SEARCH_PLACEHOLDER: &str = "궁금한 도시를 검색해보세요!";

const LOADING: &str = "상큼한 날씨 정보를 준비 중이에요!";
const EMPTY: &str = "어디의 날씨가 궁금하신가요?";
const SEARCH_HINT: &str = "검색창에 도시 이름을 입력하면 바로 알려드릴게요!";
const SOURCES_HEADING: &str = "AI가 참고한 생생한 정보들";
const DISCLAIMER: &str =
    "AI 분석 특성상 실제 날씨와 차이가 있을 수 있으니 외출 전 창밖을 한 번 더 확인해 주세요!";
const RULE_WIDTH: usize = 48;

/// Full screen for the current session: header plus the state's body.
pub fn view(session: &Session) -> String {
    let mut out = header(session.position());

    match session.state() {
        RequestState::Resolving | RequestState::Fetching => loading(&mut out),
        RequestState::Success(report) => report_view(&mut out, report),
        // A failed fetch looks like "nothing asked yet"; the error only goes to the log.
        RequestState::Idle | RequestState::Failed(_) => match session.location_error() {
            Some(err) => location_error(&mut out, err),
            None => empty(&mut out),
        },
    }

    out
}

/// Machine-readable outcome: `{"state": "success", "report": ...}` on success,
/// otherwise the state name with the failure or location reason if any.
pub fn json_state(session: &Session) -> serde_json::Result<Value> {
    let location_error = session.location_error().map(ToString::to_string);

    let value = match session.state() {
        RequestState::Success(report) => {
            json!({ "state": "success", "report": serde_json::to_value(report)? })
        }
        RequestState::Failed(reason) => json!({ "state": "failed", "reason": reason }),
        RequestState::Idle => json!({ "state": "idle", "locationError": location_error }),
        RequestState::Resolving | RequestState::Fetching => json!({ "state": "loading" }),
    };

    Ok(value)
}

/// `37.6, 127.0`, or `내 위치` until geolocation succeeds.
pub fn badge(position: Option<Coordinates>) -> String {
    match position {
        Some(c) => format!("{:.1}, {:.1}", c.lat, c.lng),
        None => "내 위치".to_string(),
    }
}

fn header(position: Option<Coordinates>) -> String {
    format!("☀ {APP_NAME}    📍 {}\n{}\n", badge(position), "─".repeat(RULE_WIDTH))
}

fn loading(out: &mut String) {
    let _ = writeln!(out, "\n  ⏳ {LOADING}\n");
}

fn empty(out: &mut String) {
    let _ = writeln!(out, "\n  ⛅ {EMPTY}\n");
}

fn location_error(out: &mut String, err: &LocationUnavailable) {
    let _ = writeln!(out, "\n  ⓘ {err}");
    let _ = writeln!(out, "  {SEARCH_HINT}\n");
}

fn report_view(out: &mut String, report: &WeatherReport) {
    let _ = writeln!(out, "\n✨ AI CASTER REPORT");
    let _ = writeln!(out, "{}", report.location);
    let _ = writeln!(out, "오늘의 날씨는 어떨까요? ✨\n");

    for line in report.forecast_text.lines().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "{line}");
    }

    if !report.sources.is_empty() {
        let _ = writeln!(out, "\n📚 {SOURCES_HEADING}");
        for (idx, source) in report.sources.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", idx + 1, source.title);
            let _ = writeln!(out, "     {}", source.uri);
        }
    }

    let _ = writeln!(out, "\nBe Bright & Stay Fresh");
    let _ = writeln!(out, "{DISCLAIMER}");
}
