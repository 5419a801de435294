use chrono::{DateTime, Duration, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Sunscreen,
    Moisturizer,
}

impl ReminderKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReminderKind::Sunscreen => "Sunscreen reminder",
            ReminderKind::Moisturizer => "Moisturizer reminder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    pub kind: ReminderKind,
    pub message: &'static str,
    pub delay: Duration,
}

impl ReminderPlan {
    pub fn trigger_at<Tz: TimeZone>(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        now + self.delay
    }
}

/// Pick the message and delay for a reminder requested at local hour `now_hour`.
pub fn plan_reminder(kind: ReminderKind, now_hour: u32) -> ReminderPlan {
    let (message, minutes) = match kind {
        ReminderKind::Sunscreen => match now_hour {
            h if h < 10 => ("Good morning! Start the day with sunscreen before heading out.", 120),
            h if h < 12 => ("Midday sun is on its way. Time to reapply your sunscreen.", 120),
            h if h < 15 => ("UV is at its peak. Refresh your sunscreen now.", 120),
            h if h < 17 => ("The afternoon sun still burns. One more layer of sunscreen?", 90),
            _ => ("Evening sun carries UV too. Add one last layer of protection.", 60),
        },
        ReminderKind::Moisturizer => match now_hour {
            h if h < 11 => ("Good morning! Moisturize for hydrated skin all day.", 180),
            h if h < 15 => ("Midday routine: your skin may be dry, time to moisturize.", 180),
            h if h < 19 => ("Evening is coming. Give your tired skin some moisture.", 120),
            _ => ("Last task before bed: apply your night moisturizer.", 60),
        },
    };

    ReminderPlan { kind, message, delay: Duration::minutes(minutes) }
}
