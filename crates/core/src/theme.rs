use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 3],
    pub accent: [u8; 3],
    pub text: [u8; 3],
}

/// Date-derived visual variant. Stateless; carries no persisted identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub palette: Palette,
    pub title_override: Option<&'static str>,
    pub background_asset_key: Option<&'static str>,
}

/// One recurring theme: a date predicate plus the theme it activates.
/// Adding a theme means adding a row here; the renderer never changes.
struct ThemeRule {
    applies: fn(NaiveDate) -> bool,
    theme: Theme,
}

const CRAZY_THURSDAY: Theme = Theme {
    name: "crazy_thursday",
    palette: Palette {
        background: [0xe4, 0x00, 0x2b],
        accent: [0xff, 0xd7, 0x00],
        text: [0xff, 0xff, 0xff],
    },
    title_override: Some("疯狂星期四 · 今日快餐比价早报"),
    background_asset_key: Some("crazy_thursday"),
};

const RULES: &[ThemeRule] = &[ThemeRule {
    applies: is_thursday,
    theme: CRAZY_THURSDAY,
}];

fn is_thursday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Thu
}

/// Pure function of the calendar date. `None` means the default styling
/// applies.
pub fn resolve(date: NaiveDate) -> Option<Theme> {
    RULES
        .iter()
        .find(|rule| (rule.applies)(date))
        .map(|rule| rule.theme)
}
