use chrono::{DateTime, Local};
use uvcast_core::{
    SavedPlace, SearchResult,
    derive::{UvSample, daily_summaries, format_clock_hour},
    model::PlaceKind,
    reminder::ReminderPlan,
    session::Snapshot,
};

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn sample(s: &UvSample) -> String {
    format!("{:02}:00 → {}", s.hour, s.uv)
}

fn location_label(snapshot: &Snapshot) -> String {
    let Some(place) = snapshot.payload.location.as_ref() else {
        return snapshot.query.as_param();
    };

    let parts: Vec<&str> = [&place.name, &place.region, &place.country]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() { snapshot.query.as_param() } else { parts.join(", ") }
}

pub fn print_current(snapshot: &Snapshot) {
    let m = &snapshot.metrics;

    println!("{}  (updated {})", location_label(snapshot), snapshot.fetched_at.format("%H:%M"));
    println!(
        "  {}  {}°C  humidity {}%",
        m.condition.as_deref().unwrap_or("-"),
        or_dash(m.temperature_c),
        or_dash(m.humidity),
    );
    println!(
        "  theme: {} (background {}, accent {})",
        m.theme,
        m.theme.background_color(),
        m.theme.accent_color()
    );

    match (m.current_uv, m.current_level) {
        (Some(now), Some(level)) => println!("  UV now: {} ({})", sample(&now), level.label()),
        _ => println!("  UV now: -"),
    }

    if !m.next_uv.is_empty() {
        let next: Vec<String> = m.next_uv.iter().map(sample).collect();
        println!("  next hours: {}", next.join(", "));
    }

    if let Some(max) = m.daily_max_uv {
        println!("  max UV: {} at {}", max.uv, format_clock_hour(max.hour));
    }

    if let (Some(sunrise), Some(sunset)) = (&m.sunrise, &m.sunset) {
        println!("  sunrise {sunrise}  sunset {sunset}");
    }
}

pub fn print_forecast(snapshot: &Snapshot) {
    println!("5-day forecast for {}", location_label(snapshot));

    for day in daily_summaries(&snapshot.payload) {
        let date = day.date.map(|d| d.format("%a %d %b").to_string());
        let level = day.uv_level.map(|l| l.label());
        println!(
            "  {:<11} {:>5} / {:<5} °C  UV {:<4} {:<9} {}",
            or_dash(date),
            or_dash(day.min_temp_c),
            or_dash(day.max_temp_c),
            or_dash(day.uv),
            or_dash(level),
            day.condition.as_deref().unwrap_or(""),
        );
    }
}

pub fn print_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No places found (queries need at least 2 characters).");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        let kind = match r.kind {
            PlaceKind::City => "city",
            PlaceKind::District => "district",
        };
        println!("{:>3}. {} [{kind}] ({}, {})", i + 1, r.display_name, r.place.lat, r.place.lon);
    }
}

pub fn print_saved_places(places: &[SavedPlace]) {
    if places.is_empty() {
        println!("No saved places. Add one with `uvcast places add <query>`.");
        return;
    }

    for p in places {
        println!("{}  {} ({}, {})  [{}, {}]", p.id, p.name, p.region, p.country, p.lat, p.lon);
    }
}

pub fn print_reminder(plan: &ReminderPlan, at: DateTime<Local>) {
    println!("{} at {}", plan.kind.title(), at.format("%H:%M"));
    println!("  {}", plan.message);
}
