//! Builds the natural-language instruction sent to the model.
//!
//! The prompt is anchored to Korea Standard Time so the model searches for
//! "current" conditions relative to an explicit timestamp.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

use crate::model::LocationContext;

/// Korea Standard Time, UTC+9.
pub const KST_OFFSET_SECS: i32 = 9 * 60 * 60;

pub const KST: FixedOffset = match FixedOffset::east_opt(KST_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("KST offset out of range"),
};

const CONTENT_ITEMS: [&str; 7] = [
    "현재 온도와 느껴지는 체감 온도",
    "현재 하늘 상태 (맑음, 흐림, 비 등)",
    "습도와 풍속 정보",
    "오늘 하루의 대략적인 기온 변화 예보",
    "오늘의 날씨에 딱 맞는 옷차림 추천",
    "오늘 하기 좋은 야외 또는 실내 활동 추천",
    "미세먼지나 자외선 등 주의사항",
];

/// The given instant as seen in KST.
pub fn kst_wall_clock(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&KST)
}

/// Format a timestamp in KST as a Korean long date/time,
/// e.g. `2026년 10월 18일 일요일 오후 03:05`.
pub fn format_kst(now: DateTime<Utc>) -> String {
    let local = kst_wall_clock(now);

    let (is_pm, hour12) = local.hour12();
    let meridiem = if is_pm { "오후" } else { "오전" };

    format!(
        "{}년 {}월 {}일 {} {} {:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        weekday_name(local.weekday()),
        meridiem,
        hour12,
        local.minute(),
    )
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

pub fn location_clause(location: &LocationContext) -> String {
    match location {
        LocationContext::City(city) => format!("현재 {city}의 상세 날씨 정보를 알려줘."),
        LocationContext::Coordinates(c) => {
            format!("현재 위도 {}, 경도 {} 위치의 상세 날씨 정보를 알려줘.", c.lat, c.lng)
        }
    }
}

/// Build the full prompt for `location` as of `now`. Deterministic.
pub fn build_prompt(location: &LocationContext, now: DateTime<Utc>) -> String {
    let time = format_kst(now);

    let mut prompt = format!(
        "기준 시간: {time} (한국 표준시)\n위 기준 시간을 바탕으로 {}\n\n다음 항목들을 포함해서 상큼하고 발랄한 말투로 설명해줘:\n",
        location_clause(location)
    );

    for (idx, item) in CONTENT_ITEMS.iter().enumerate() {
        prompt.push_str(&format!("{}. {item}\n", idx + 1));
    }

    prompt.push_str(&format!(
        "\n중요: 반드시 현재 한국 시간({time})을 기준으로 최신 정보를 검색해서 답변해줘. 모든 답변은 한국어로 해줘."
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().expect("valid timestamp")
    }

    #[test]
    fn formats_afternoon_in_kst() {
        // 06:05 UTC is 15:05 KST.
        assert_eq!(format_kst(at(2026, 10, 18, 6, 5)), "2026년 10월 18일 일요일 오후 03:05");
    }

    #[test]
    fn kst_rolls_over_to_next_day() {
        // 20:30 UTC on the 17th is 05:30 KST on the 18th.
        assert_eq!(format_kst(at(2026, 10, 17, 20, 30)), "2026년 10월 18일 일요일 오전 05:30");
    }

    #[test]
    fn wall_clock_carries_plus_nine_offset() {
        let now = at(2026, 10, 17, 20, 30);
        let local = kst_wall_clock(now);

        assert_eq!(local.offset().local_minus_utc(), KST_OFFSET_SECS);
        assert_eq!(local.to_rfc3339(), "2026-10-18T05:30:00+09:00");
        assert_eq!(local, now);
    }

    #[test]
    fn midnight_and_noon_use_twelve() {
        assert_eq!(format_kst(at(2026, 1, 4, 15, 0)), "2026년 1월 5일 월요일 오전 12:00");
        assert_eq!(format_kst(at(2026, 1, 5, 3, 0)), "2026년 1월 5일 월요일 오후 12:00");
    }

    #[test]
    fn coordinate_prompt_contains_time_and_both_numbers() {
        let now = at(2026, 10, 18, 6, 5);
        let ctx = LocationContext::Coordinates(Coordinates { lat: 37.5665, lng: 126.978 });
        let prompt = build_prompt(&ctx, now);

        assert!(prompt.contains(&format_kst(now)));
        assert!(prompt.contains("37.5665"));
        assert!(prompt.contains("126.978"));
        assert!(prompt.contains("위도 37.5665, 경도 126.978"));
    }

    #[test]
    fn whole_degrees_render_without_fraction() {
        let ctx = LocationContext::Coordinates(Coordinates { lat: 35.0, lng: -127.0 });
        assert!(location_clause(&ctx).contains("위도 35, 경도 -127"));
    }

    #[test]
    fn nan_coordinates_pass_through() {
        let ctx = LocationContext::Coordinates(Coordinates { lat: f64::NAN, lng: 1.5 });
        assert!(build_prompt(&ctx, at(2026, 1, 1, 0, 0)).contains("위도 NaN, 경도 1.5"));
    }

    #[test]
    fn city_prompt_has_city_and_no_coordinate_clause() {
        let now = at(2026, 10, 18, 6, 5);
        let ctx = LocationContext::City("New York".into());
        let prompt = build_prompt(&ctx, now);

        assert!(prompt.contains("현재 New York의 상세 날씨 정보를 알려줘."));
        assert!(!prompt.contains("위도"));
        assert!(!prompt.contains("경도"));
    }

    #[test]
    fn prompt_lists_all_items_and_closing_instruction() {
        let now = at(2026, 10, 18, 6, 5);
        let prompt = build_prompt(&LocationContext::City("서울".into()), now);

        for (idx, item) in CONTENT_ITEMS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {item}", idx + 1)));
        }
        assert!(prompt.contains("모든 답변은 한국어로 해줘."));
        assert_eq!(prompt.matches(&format_kst(now)).count(), 2);
    }

    #[test]
    fn prompt_is_deterministic() {
        let now = at(2026, 3, 1, 12, 0);
        let ctx = LocationContext::City("제주".into());
        assert_eq!(build_prompt(&ctx, now), build_prompt(&ctx, now));
    }
}
