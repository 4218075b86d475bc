//! Gifting calendar: recurring Colombian and international special dates.

use chrono::{Datelike, NaiveDate};

use crate::catalog::normalize_festival_tag;
use crate::models::{CategoryInfo, DateCategory, FestivalOption, SpecialDate, UpcomingDate};

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

static SPECIAL_DATES: [SpecialDate; 10] = [
    SpecialDate {
        id: "san-valentin",
        name: "Día de San Valentín",
        date: "02-14",
        description: "Celebra el amor con regalos personalizados únicos para tu pareja especial.",
        category: DateCategory::Amor,
        gift_suggestions: &["Camisetas de pareja", "Pocillos personalizados", "Kit romántico"],
        color: "red",
        icon: "heart",
    },
    SpecialDate {
        id: "dia-madre",
        name: "Día de la Madre",
        date: "05-12",
        description: "Honra a mamá con un regalo hecho con amor y personalizado especialmente para ella.",
        category: DateCategory::Familia,
        gift_suggestions: &["Pocillo personalizado", "Camiseta con mensaje", "Estampados familiares"],
        color: "pink",
        icon: "heart",
    },
    SpecialDate {
        id: "dia-padre",
        name: "Día del Padre",
        date: "06-16",
        description: "Demuestra tu amor por papá con regalos únicos y personalizados.",
        category: DateCategory::Familia,
        gift_suggestions: &["Camiseta personalizada", "Pocillo de oficina", "Llavero personalizado"],
        color: "blue",
        icon: "user",
    },
    SpecialDate {
        id: "dia-amistad",
        name: "Día del Amor y la Amistad",
        date: "09-21",
        description: "Celebra la amistad con regalos especiales para tus amigos más queridos.",
        category: DateCategory::Amistad,
        gift_suggestions: &["Kit de amistad", "Camisetas grupales", "Estampados divertidos"],
        color: "yellow",
        icon: "users",
    },
    SpecialDate {
        id: "halloween",
        name: "Halloween",
        date: "10-31",
        description: "Disfraces y accesorios personalizados para una noche de terror divertida.",
        category: DateCategory::Celebracion,
        gift_suggestions: &["Camisetas temáticas", "Estampados de terror", "Accesorios de disfraces"],
        color: "orange",
        icon: "ghost",
    },
    SpecialDate {
        id: "navidad",
        name: "Navidad",
        date: "12-25",
        description: "La época más especial del año merece regalos únicos y personalizados.",
        category: DateCategory::Religioso,
        gift_suggestions: &["Kit navideño", "Camisetas familiares", "Pocillos navideños"],
        color: "green",
        icon: "gift",
    },
    SpecialDate {
        id: "ano-nuevo",
        name: "Año Nuevo",
        date: "01-01",
        description: "Comienza el año con regalos especiales y propósitos renovados.",
        category: DateCategory::Celebracion,
        gift_suggestions: &["Camisetas motivacionales", "Pocillos de año nuevo", "Kit de propósitos"],
        color: "purple",
        icon: "calendar",
    },
    SpecialDate {
        id: "dia-mujer",
        name: "Día Internacional de la Mujer",
        date: "03-08",
        description: "Celebra la fuerza y belleza de las mujeres con regalos empoderados.",
        category: DateCategory::Celebracion,
        gift_suggestions: &["Camisetas empoderadas", "Pocillos inspiracionales", "Estampados motivacionales"],
        color: "purple",
        icon: "crown",
    },
    SpecialDate {
        id: "dia-nino",
        name: "Día del Niño",
        date: "04-27",
        description: "Regalos divertidos y coloridos para los más pequeños de la casa.",
        category: DateCategory::Familia,
        gift_suggestions: &["Camisetas infantiles", "Estampados divertidos", "Accesorios coloridos"],
        color: "rainbow",
        icon: "baby",
    },
    SpecialDate {
        id: "graduaciones",
        name: "Temporada de Graduaciones",
        date: "06-15",
        description: "Celebra los logros académicos con regalos personalizados únicos.",
        category: DateCategory::Celebracion,
        gift_suggestions: &["Camisetas de graduación", "Pocillos conmemorativos", "Kit de graduado"],
        color: "gold",
        icon: "graduation-cap",
    },
];

pub fn special_dates() -> &'static [SpecialDate] {
    &SPECIAL_DATES
}

/// Month and day of an `MM-DD` date.
fn month_day(date: &str) -> Option<(u32, u32)> {
    let (month, day) = date.split_once('-')?;
    Some((month.parse().ok()?, day.parse().ok()?))
}

/// First occurrence of `date` on or after `today`.
fn next_occurrence(date: &SpecialDate, today: NaiveDate) -> Option<NaiveDate> {
    let (month, day) = month_day(date.date)?;
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(d) if d >= today => Some(d),
        _ => (1..=4).find_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day)),
    }
}

/// The next `limit` special dates counted from `today`, soonest first.
///
/// A date falling on `today` is 0 days away.
pub fn get_upcoming_dates(today: NaiveDate, limit: usize) -> Vec<UpcomingDate> {
    let mut upcoming: Vec<UpcomingDate> = SPECIAL_DATES
        .iter()
        .filter_map(|date| {
            let next = next_occurrence(date, today)?;
            let days_until = (next - today).num_days();
            Some(UpcomingDate {
                date: date.clone(),
                next_occurrence: next.format("%Y-%m-%d").to_string(),
                days_until,
                label: format_days_until(days_until),
            })
        })
        .collect();

    upcoming.sort_by_key(|d| d.days_until);
    upcoming.truncate(limit);
    upcoming
}

pub fn get_dates_by_category(category: DateCategory) -> Vec<SpecialDate> {
    SPECIAL_DATES
        .iter()
        .filter(|d| d.category == category)
        .cloned()
        .collect()
}

/// Dates falling in `month` (1-12).
pub fn get_dates_by_month(month: u32) -> Vec<SpecialDate> {
    SPECIAL_DATES
        .iter()
        .filter(|d| month_day(d.date).is_some_and(|(m, _)| m == month))
        .cloned()
        .collect()
}

pub fn format_days_until(days: i64) -> String {
    match days {
        0 => "¡Hoy!".to_string(),
        1 => "¡Mañana!".to_string(),
        d if d <= 7 => format!("En {} días", d),
        d if d <= 30 => format!("En {} semanas", (d + 6) / 7),
        d => format!("En {} meses", (d + 29) / 30),
    }
}

pub fn categories() -> Vec<CategoryInfo> {
    DateCategory::ALL
        .into_iter()
        .map(|c| CategoryInfo {
            id: c,
            label: c.label(),
            color: c.color(),
        })
        .collect()
}

/// Tag choices for marking products with a festival.
pub fn festival_options() -> Vec<FestivalOption> {
    SPECIAL_DATES
        .iter()
        .map(|d| FestivalOption {
            id: d.id,
            name: d.name,
            tag: normalize_festival_tag(d.id),
        })
        .collect()
}
