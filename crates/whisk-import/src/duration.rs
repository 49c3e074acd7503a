//! ISO-8601 duration rendering (`PT1H30M` to `1 hours and 30 minutes`).

use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(?P<years>\d+(?:[.,]\d+)?)Y)?(?:(?P<months>\d+(?:[.,]\d+)?)M)?(?:(?P<weeks>\d+(?:[.,]\d+)?)W)?(?:(?P<days>\d+(?:[.,]\d+)?)D)?(?:T(?:(?P<hours>\d+(?:[.,]\d+)?)H)?(?:(?P<minutes>\d+(?:[.,]\d+)?)M)?(?:(?P<seconds>\d+(?:[.,]\d+)?)S)?)?$",
    )
    .expect("Invalid ISO-8601 duration regex")
});

/// Render an ISO-8601 duration as text.
///
/// Only hour, minute and second components are rendered; zero components are
/// omitted. Absent or unparseable input renders as an empty string.
pub fn humanize(raw: &str) -> String {
    let raw = raw.trim();
    let Some(caps) = ISO_DURATION.captures(raw) else {
        return String::new();
    };

    let parts: Vec<String> = ["hours", "minutes", "seconds"]
        .into_iter()
        .filter_map(|unit| {
            let value = caps.name(unit)?.as_str().replace(',', ".");
            let number: f64 = value.parse().ok()?;
            (number > 0.0).then(|| format!("{} {}", format_number(number), unit))
        })
        .collect();

    join_conjunction(&parts)
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as u64)
    } else {
        format!("{}", number)
    }
}

/// Join as an English list: `A`, `A and B`, `A, B, and C`.
pub fn join_conjunction(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
