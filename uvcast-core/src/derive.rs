//! Client-side metrics computed from a fetched [`ForecastPayload`].
//!
//! Everything here is pure: missing fields produce `None` or empty parts
//! rather than errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{ForecastDay, ForecastPayload};

/// Condition keywords meaning "clear/sunny" in the endpoint's Turkish texts.
pub const SUNNY_KEYWORDS: [&str; 3] = ["güneşli", "açık", "kısmen güneşli"];

const NEXT_SAMPLE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvSample {
    pub hour: u32,
    pub uv: f64,
}

/// Background theme shared by every screen of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Sun,
    Cloud,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Sun => "sun",
            Theme::Cloud => "cloud",
        }
    }

    pub fn background_color(&self) -> &'static str {
        match self {
            Theme::Sun => "#FFF3D4",
            Theme::Cloud => "#87CEEB",
        }
    }

    pub fn accent_color(&self) -> &'static str {
        match self {
            Theme::Sun => "#FFA500",
            Theme::Cloud => "#4A90E2",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UV risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn from_uv(uv: f64) -> Self {
        if uv <= 2.0 {
            UvLevel::Low
        } else if uv <= 5.0 {
            UvLevel::Moderate
        } else if uv <= 7.0 {
            UvLevel::High
        } else if uv <= 10.0 {
            UvLevel::VeryHigh
        } else {
            UvLevel::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very High",
            UvLevel::Extreme => "Extreme",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            UvLevel::Low => "#87CEEB",
            UvLevel::Moderate => "#4A90E2",
            UvLevel::High => "#FF9500",
            UvLevel::VeryHigh => "#FF3B30",
            UvLevel::Extreme => "#AF52DE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub current_uv: Option<UvSample>,
    pub current_level: Option<UvLevel>,
    pub next_uv: Vec<UvSample>,
    pub daily_max_uv: Option<UvSample>,
    /// The day's UV as reported by the endpoint (`day.uv`).
    pub reported_daily_uv: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub theme: Theme,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: Option<NaiveDate>,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub uv: Option<f64>,
    pub uv_level: Option<UvLevel>,
    pub condition: Option<String>,
}

/// Derive every UI-ready value from `payload` for the local hour `now_hour`.
pub fn derive(payload: &ForecastPayload, now_hour: u32) -> DerivedMetrics {
    let today = payload.today();
    let current = payload.current.as_ref();
    let current_uv = current_sample(payload, now_hour);
    let astro = today.and_then(|d| d.astro.as_ref());

    DerivedMetrics {
        current_uv,
        current_level: current_uv.map(|s| UvLevel::from_uv(s.uv)),
        next_uv: today.map(|d| next_samples(d, now_hour)).unwrap_or_default(),
        daily_max_uv: today.and_then(daily_max),
        reported_daily_uv: today.and_then(|d| d.day.as_ref()).and_then(|d| d.uv),
        sunrise: astro.and_then(|a| a.sunrise.clone()),
        sunset: astro.and_then(|a| a.sunset.clone()),
        theme: payload.condition_text().map(select_theme).unwrap_or(Theme::Cloud),
        temperature_c: current.and_then(|c| c.temp_c),
        humidity: current.and_then(|c| c.humidity),
        condition: payload.condition_text().map(str::to_string),
    }
}

/// The payload's current UV tagged with the local hour.
pub fn current_sample(payload: &ForecastPayload, now_hour: u32) -> Option<UvSample> {
    let uv = payload.current.as_ref()?.uv?;
    Some(UvSample { hour: now_hour, uv })
}

/// Earliest two same-day samples strictly after `now_hour`, in chronological order.
pub fn next_samples(day: &ForecastDay, now_hour: u32) -> Vec<UvSample> {
    let mut samples: Vec<UvSample> = day
        .hour
        .iter()
        .filter_map(|h| Some(UvSample { hour: h.hour()?, uv: h.uv? }))
        .filter(|s| s.hour > now_hour)
        .collect();

    samples.sort_by_key(|s| s.hour);
    samples.truncate(NEXT_SAMPLE_COUNT);
    samples
}

/// Highest hourly UV of the day. Ties go to the earliest hour.
pub fn daily_max(day: &ForecastDay) -> Option<UvSample> {
    day.hour
        .iter()
        .filter_map(|h| Some(UvSample { hour: h.hour()?, uv: h.uv? }))
        .fold(None, |best: Option<UvSample>, s| match best {
            Some(b) if s.uv > b.uv || (s.uv == b.uv && s.hour < b.hour) => Some(s),
            Some(b) => Some(b),
            None => Some(s),
        })
}

pub fn select_theme(condition_text: &str) -> Theme {
    let text = condition_text.to_lowercase();
    if SUNNY_KEYWORDS.iter().any(|k| text.contains(k)) { Theme::Sun } else { Theme::Cloud }
}

pub fn daily_summaries(payload: &ForecastPayload) -> Vec<DailySummary> {
    payload
        .days()
        .iter()
        .map(|d| {
            let stats = d.day.as_ref();
            let uv = stats.and_then(|s| s.uv);
            DailySummary {
                date: d.parsed_date(),
                min_temp_c: stats.and_then(|s| s.mintemp_c),
                max_temp_c: stats.and_then(|s| s.maxtemp_c),
                uv,
                uv_level: uv.map(UvLevel::from_uv),
                condition: stats
                    .and_then(|s| s.condition.as_ref())
                    .and_then(|c| c.text.clone()),
            }
        })
        .collect()
}

/// 12-hour clock label without a suffix, e.g. `15` → `"3:00"`.
pub fn format_clock_hour(hour: u32) -> String {
    let h = if hour > 12 { hour - 12 } else { hour };
    format!("{h}:00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Astro, Condition, CurrentConditions, DayStats, Forecast, HourForecast};

    fn hour(h: u32, uv: f64) -> HourForecast {
        HourForecast { time: Some(format!("2024-06-20 {h:02}:00")), uv: Some(uv) }
    }

    fn payload(current_uv: f64, text: &str, hours: Vec<HourForecast>) -> ForecastPayload {
        ForecastPayload {
            location: None,
            current: Some(CurrentConditions {
                temp_c: Some(27.5),
                condition: Some(Condition { text: Some(text.into()), icon: None }),
                humidity: Some(40.0),
                uv: Some(current_uv),
            }),
            forecast: Some(Forecast {
                forecastday: vec![ForecastDay {
                    date: Some("2024-06-20".into()),
                    day: Some(DayStats {
                        maxtemp_c: Some(30.0),
                        mintemp_c: Some(19.0),
                        uv: Some(9.0),
                        condition: None,
                    }),
                    astro: Some(Astro {
                        sunrise: Some("05:32 AM".into()),
                        sunset: Some("08:41 PM".into()),
                    }),
                    hour: hours,
                }],
            }),
        }
    }

    fn full_day() -> Vec<HourForecast> {
        (0..24)
            .map(|h| match h {
                14 => hour(h, 7.0),
                15 => hour(h, 9.0),
                16 => hour(h, 4.0),
                h if h < 14 => hour(h, (h as f64 / 3.0).floor()),
                h => hour(h, 0.0),
            })
            .collect()
    }

    #[test]
    fn sunny_afternoon_end_to_end() {
        let m = derive(&payload(6.0, "Güneşli", full_day()), 13);

        assert_eq!(m.current_uv, Some(UvSample { hour: 13, uv: 6.0 }));
        assert_eq!(m.next_uv, vec![UvSample { hour: 14, uv: 7.0 }, UvSample { hour: 15, uv: 9.0 }]);
        assert_eq!(m.daily_max_uv, Some(UvSample { hour: 15, uv: 9.0 }));
        assert_eq!(m.theme, Theme::Sun);
        assert_eq!(m.current_level, Some(UvLevel::High));
        assert_eq!(m.sunrise.as_deref(), Some("05:32 AM"));
        assert_eq!(m.sunset.as_deref(), Some("08:41 PM"));
        assert_eq!(m.reported_daily_uv, Some(9.0));
    }

    #[test]
    fn daily_max_tie_goes_to_earliest_hour() {
        let day = ForecastDay {
            hour: vec![hour(10, 5.0), hour(11, 8.0), hour(12, 8.0), hour(13, 3.0)],
            ..Default::default()
        };
        assert_eq!(daily_max(&day), Some(UvSample { hour: 11, uv: 8.0 }));
    }

    #[test]
    fn daily_max_tie_is_by_hour_not_position() {
        let day = ForecastDay { hour: vec![hour(12, 8.0), hour(11, 8.0)], ..Default::default() };
        assert_eq!(daily_max(&day), Some(UvSample { hour: 11, uv: 8.0 }));
    }

    #[test]
    fn daily_max_of_empty_day_is_none() {
        assert_eq!(daily_max(&ForecastDay::default()), None);
    }

    #[test]
    fn next_samples_do_not_wrap_or_pad() {
        let day = ForecastDay { hour: full_day(), ..Default::default() };

        assert_eq!(next_samples(&day, 22), vec![UvSample { hour: 23, uv: 0.0 }]);
        assert!(next_samples(&day, 23).is_empty());
    }

    #[test]
    fn next_samples_are_sorted_and_strictly_later() {
        let day = ForecastDay {
            hour: vec![hour(18, 1.0), hour(9, 2.0), hour(16, 4.0), hour(17, 3.0)],
            ..Default::default()
        };

        let next = next_samples(&day, 15);
        assert_eq!(next, vec![UvSample { hour: 16, uv: 4.0 }, UvSample { hour: 17, uv: 3.0 }]);
        assert!(next.iter().all(|s| s.hour > 15));
    }

    #[test]
    fn theme_matches_keywords_case_insensitively() {
        assert_eq!(select_theme("Güneşli"), Theme::Sun);
        assert_eq!(select_theme("Açık"), Theme::Sun);
        assert_eq!(select_theme("GÜNEŞLI"), Theme::Sun);
        assert_eq!(select_theme("Parçalı bulutlu, kısmen güneşli"), Theme::Sun);
        assert_eq!(select_theme("Hafif yağmurlu"), Theme::Cloud);
        assert_eq!(select_theme("Bulutlu"), Theme::Cloud);
        assert_eq!(select_theme(""), Theme::Cloud);
    }

    #[test]
    fn theme_palettes_differ() {
        assert_eq!(Theme::default(), Theme::Sun);
        assert_eq!(
            (Theme::Sun.background_color(), Theme::Sun.accent_color()),
            ("#FFF3D4", "#FFA500")
        );
        assert_eq!(
            (Theme::Cloud.background_color(), Theme::Cloud.accent_color()),
            ("#87CEEB", "#4A90E2")
        );
    }

    #[test]
    fn empty_payload_yields_empty_metrics() {
        let m = derive(&ForecastPayload::default(), 9);

        assert!(m.current_uv.is_none());
        assert!(m.next_uv.is_empty());
        assert!(m.daily_max_uv.is_none());
        assert!(m.sunrise.is_none());
        assert_eq!(m.theme, Theme::Cloud);
    }

    #[test]
    fn uv_level_boundaries() {
        assert_eq!(UvLevel::from_uv(0.0), UvLevel::Low);
        assert_eq!(UvLevel::from_uv(2.0), UvLevel::Low);
        assert_eq!(UvLevel::from_uv(2.1), UvLevel::Moderate);
        assert_eq!(UvLevel::from_uv(5.0), UvLevel::Moderate);
        assert_eq!(UvLevel::from_uv(7.0), UvLevel::High);
        assert_eq!(UvLevel::from_uv(10.0), UvLevel::VeryHigh);
        assert_eq!(UvLevel::from_uv(11.0), UvLevel::Extreme);
    }

    #[test]
    fn summaries_cover_every_day() {
        let p = payload(3.0, "Bulutlu", vec![]);
        let s = daily_summaries(&p);

        assert_eq!(s.len(), 1);
        assert_eq!(s[0].date, NaiveDate::from_ymd_opt(2024, 6, 20));
        assert_eq!(s[0].max_temp_c, Some(30.0));
        assert_eq!(s[0].uv_level, Some(UvLevel::VeryHigh));
    }

    #[test]
    fn clock_hour_uses_twelve_hour_labels() {
        assert_eq!(format_clock_hour(9), "9:00");
        assert_eq!(format_clock_hour(12), "12:00");
        assert_eq!(format_clock_hour(15), "3:00");
    }
}
