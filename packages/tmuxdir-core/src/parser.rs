//! Delimited field parsing for `tmux list-* -F` output.
//!
//! Each record type names its format items once, in [`ListRecord::FIELDS`].
//! The `-F` argument is built from that list and lines are split back along
//! the same list, so the request and the index mapping cannot drift apart.

use std::str::FromStr;

/// Field separator placed between format items.
///
/// Session names, window names, paths and layouts are free-form, so a single
/// `,` or `|` is not safe here.
pub const FIELD_DELIM: &str = "|||";

/// A record that can be requested from and parsed out of a tmux listing.
pub trait ListRecord: Sized {
    /// tmux format items, in the order they appear on each line.
    const FIELDS: &'static [&'static str];

    fn from_fields(fields: &Fields<'_>) -> Self;
}

/// The `-F` argument for `R`.
pub fn format_string<R: ListRecord>() -> String {
    R::FIELDS.join(FIELD_DELIM)
}

/// One line split into positional fields.
///
/// Missing trailing fields read as empty, so accessors never fail.
#[derive(Debug)]
pub struct Fields<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn split(line: &'a str, arity: usize) -> Self {
        let line = line.strip_suffix('\r').unwrap_or(line);
        Self {
            parts: line.splitn(arity.max(1), FIELD_DELIM).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn raw(&self, index: usize) -> &'a str {
        self.parts.get(index).copied().unwrap_or("")
    }

    pub fn text(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    /// Integer field; empty or malformed values read as the type's default (0).
    pub fn number<T: FromStr + Default>(&self, index: usize) -> T {
        self.raw(index).trim().parse().unwrap_or_default()
    }

    /// tmux booleans are `1`/`0`; anything else is false.
    pub fn flag(&self, index: usize) -> bool {
        self.raw(index) == "1"
    }
}

pub fn parse_line<R: ListRecord>(line: &str) -> R {
    R::from_fields(&Fields::split(line, R::FIELDS.len()))
}

/// Parse every non-blank line of `output`. Order is preserved.
pub fn parse_records<R: ListRecord>(output: &str) -> Vec<R> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line::<R>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Probe {
        label: String,
        count: u32,
        on: bool,
    }

    impl ListRecord for Probe {
        const FIELDS: &'static [&'static str] = &["#{a}", "#{b}", "#{c}"];

        fn from_fields(fields: &Fields<'_>) -> Self {
            Probe {
                label: fields.text(0),
                count: fields.number(1),
                on: fields.flag(2),
            }
        }
    }

    #[test]
    fn test_format_string_joins_fields() {
        assert_eq!(format_string::<Probe>(), "#{a}|||#{b}|||#{c}");
    }

    #[test]
    fn test_missing_trailing_fields_default() {
        let probe: Probe = parse_line("alpha");
        assert_eq!(
            probe,
            Probe {
                label: "alpha".into(),
                count: 0,
                on: false
            }
        );
    }

    #[test]
    fn test_malformed_number_defaults_to_zero() {
        let probe: Probe = parse_line("alpha|||x7|||1");
        assert_eq!(probe.count, 0);
        assert!(probe.on);
    }

    #[test]
    fn test_flag_only_accepts_one() {
        assert!(!parse_line::<Probe>("a|||1|||true").on);
        assert!(!parse_line::<Probe>("a|||1|||2").on);
        assert!(!parse_line::<Probe>("a|||1|||").on);
    }

    #[test]
    fn test_single_pipes_and_commas_stay_in_field() {
        let probe: Probe = parse_line("a|b,c|||4|||0");
        assert_eq!(probe.label, "a|b,c");
        assert_eq!(probe.count, 4);
    }

    #[test]
    fn test_extra_delimiters_fold_into_last_field() {
        let fields = Fields::split("a|||b|||c|||d", 3);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.raw(2), "c|||d");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let records: Vec<Probe> = parse_records("\n   \n\t\n");
        assert!(records.is_empty());

        let records: Vec<Probe> = parse_records("a|||1|||1\n\n  \nb|||2|||0\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].label, "b");
        assert!(!records[1].on);
    }
}
