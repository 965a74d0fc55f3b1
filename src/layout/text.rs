use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LayoutConfig;
use crate::model::Person;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d{1,4})(?:-(\d{1,2})(?:-(\d{1,2}))?)?").unwrap());

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ELLIPSIS: char = '\u{2026}';
const MAX_NAME_LINES: usize = 2;

/// Text drawn on a node card.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub initials: String,
    pub name_lines: Vec<String>,
    pub lifespan: String,
}

pub fn node_label(person: &Person, config: &LayoutConfig, font_size: f32) -> NodeLabel {
    let max_width = (config.max_name_chars.max(1) as f32 * average_char_width(font_size))
        .min(config.node_width.max(1.0));
    NodeLabel {
        initials: initials(&person.name),
        name_lines: wrap_name(&person.name, max_width, font_size),
        lifespan: lifespan(person),
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Year part of a recorded date, if it has one.
pub fn year_of(date: &str) -> Option<i32> {
    let caps = ISO_DATE_RE.captures(date)?;
    caps.get(1)?.as_str().parse().ok()
}

/// `"1920 - 1995"`, `"1950"` while no death is recorded, `"?"` when the birth
/// is unknown.
pub fn lifespan(person: &Person) -> String {
    let birth = person
        .birth_date
        .as_deref()
        .and_then(year_of)
        .map(|year| year.to_string())
        .unwrap_or_else(|| "?".to_string());
    match person.death_date.as_deref().and_then(year_of) {
        Some(death) => format!("{birth} - {death}"),
        None => birth,
    }
}

/// Long form used by the detail view. An absent date is unknown; a date that
/// was recorded as an empty string was deliberately left blank.
pub fn format_date(date: Option<&str>) -> String {
    let Some(date) = date else {
        return "Unknown".to_string();
    };
    if date.trim().is_empty() {
        return "Not recorded".to_string();
    }
    let Some(caps) = ISO_DATE_RE.captures(date) else {
        return date.trim().to_string();
    };
    let year = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let month = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|m| (1..=12).contains(m));
    let day = caps
        .get(3)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|d| (1..=31).contains(d));
    match (month, day) {
        (Some(month), Some(day)) => format!("{} {day}, {year}", MONTHS[month - 1]),
        (Some(month), None) => format!("{} {year}", MONTHS[month - 1]),
        _ => year.to_string(),
    }
}

/// Wraps a name onto at most two lines of `max_width`, ellipsizing the rest.
pub(crate) fn wrap_name(name: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in name.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    if lines.len() > MAX_NAME_LINES {
        let rest = lines.split_off(MAX_NAME_LINES - 1).join(" ");
        lines.push(rest);
    }
    for line in &mut lines {
        if text_width(line, font_size) > max_width {
            *line = ellipsize(line, max_width, font_size);
        }
    }
    lines
}

fn ellipsize(line: &str, max_width: f32, font_size: f32) -> String {
    let budget = max_width - char_width_factor(ELLIPSIS) * font_size;
    let mut out = String::new();
    let mut width = 0.0;
    for ch in line.chars() {
        let w = char_width_factor(ch) * font_size;
        if width + w > budget {
            break;
        }
        width += w;
        out.push(ch);
    }
    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

pub(crate) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

fn average_char_width(font_size: f32) -> f32 {
    font_size * 0.56
}

/// Rough advance widths relative to the font size for a proportional face.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '\'' | '|' | '!' | '(' | ')' => 0.321,
        'i' | 'j' | 'l' | 'I' => 0.26,
        'f' | 'r' | 't' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        'A'..='Z' => 0.68,
        'a'..='z' => 0.56,
        '0'..='9' => 0.6,
        '-' => 0.4,
        ELLIPSIS => 0.9,
        _ if !ch.is_ascii() && ch.is_alphabetic() => 0.62,
        _ => 0.568,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_first_letter_of_each_word() {
        assert_eq!(initials("John Smith"), "JS");
        assert_eq!(initials("  mary   ann  lee "), "MAL");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn lifespan_variants() {
        let mut person = Person::new("1", "John").with_dates(Some("1920-05-15"), Some("1995-08-22"));
        assert_eq!(lifespan(&person), "1920 - 1995");
        person.death_date = None;
        assert_eq!(lifespan(&person), "1920");
        person.death_date = Some(String::new());
        assert_eq!(lifespan(&person), "1920");
        person.birth_date = None;
        assert_eq!(lifespan(&person), "?");
    }

    #[test]
    fn format_date_distinguishes_absent_and_blank() {
        assert_eq!(format_date(None), "Unknown");
        assert_eq!(format_date(Some("")), "Not recorded");
        assert_eq!(format_date(Some("1920-05-15")), "May 15, 1920");
        assert_eq!(format_date(Some("1920-05")), "May 1920");
        assert_eq!(format_date(Some("1920")), "1920");
        assert_eq!(format_date(Some("circa spring")), "circa spring");
    }

    #[test]
    fn year_of_reads_leading_year() {
        assert_eq!(year_of("1982-12-08"), Some(1982));
        assert_eq!(year_of("1982"), Some(1982));
        assert_eq!(year_of("unknown"), None);
    }

    #[test]
    fn short_names_stay_on_one_line() {
        assert_eq!(wrap_name("Mary Smith", 180.0, 15.0), vec!["Mary Smith"]);
    }

    #[test]
    fn long_names_wrap_to_two_lines() {
        let lines = wrap_name(
            "Alexandra Konstantinovna Rimskaya-Korsakova Volkonskaya",
            150.0,
            15.0,
        );
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(text_width(line, 15.0) <= 150.0 + 0.01, "{line} too wide");
        }
        assert!(lines[1].ends_with(ELLIPSIS));
    }

    #[test]
    fn empty_name_yields_one_empty_line() {
        assert_eq!(wrap_name("", 100.0, 15.0), vec![String::new()]);
    }
}
