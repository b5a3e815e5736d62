//! Keyboard accelerators: parse `<control>`-style bindings, strip `_`
//! mnemonic markers out of labels, and match incoming keys against a
//! per-window table.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::object::instance::ObjectId;

// =============================================================================
// Keys
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKey {
    /// A printable key, stored lowercase so `<control>Q` and
    /// `<control>q` collide.
    Char(char),
    /// Function keys F1..F12.
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelKey {
    pub base: BaseKey,
    pub control: bool,
}

impl AccelKey {
    pub const fn ctrl(c: char) -> Self {
        Self {
            base: BaseKey::Char(c),
            control: true,
        }
    }

    /// An unmodified printable key, as a stripped mnemonic produces.
    pub const fn plain(c: char) -> Self {
        Self {
            base: BaseKey::Char(c),
            control: false,
        }
    }

    /// Parse an accelerator string: an optional `<control>` prefix
    /// followed by a single character or `F1`..`F12`. Case-insensitive.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut rest = spec;
        let mut control = false;
        if let Some(stripped) = strip_prefix_ci(rest, "<control>") {
            control = true;
            rest = stripped;
        }
        let base = parse_base(rest)?;
        Some(Self { base, control })
    }

    /// Translate a terminal key event, if it names an accelerator-able
    /// key.
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        let control = event.modifiers.contains(KeyModifiers::CONTROL);
        let base = match event.code {
            KeyCode::Char(c) => BaseKey::Char(c.to_ascii_lowercase()),
            KeyCode::F(n) => BaseKey::F(n),
            _ => return None,
        };
        Some(Self { base, control })
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&s[prefix.len()..]),
        _ => None,
    }
}

fn parse_base(s: &str) -> Option<BaseKey> {
    let mut chars = s.chars();
    match (chars.next(), chars.as_str()) {
        (Some(c), "") => Some(BaseKey::Char(c.to_ascii_lowercase())),
        (Some('F') | Some('f'), digits) => {
            let n: u8 = digits.parse().ok()?;
            (1..=12).contains(&n).then_some(BaseKey::F(n))
        }
        _ => None,
    }
}

// =============================================================================
// Mnemonics
// =============================================================================

/// Strip the `_` mnemonic marker from a label: `"_New"` becomes
/// `("New", Some('n'))`. `__` escapes a literal underscore. Only the
/// first marker counts.
pub fn strip_mnemonic(label: &str) -> (String, Option<char>) {
    let mut out = String::with_capacity(label.len());
    let mut mnemonic = None;
    let mut chars = label.chars();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('_') => out.push('_'),
            Some(next) => {
                if mnemonic.is_none() {
                    mnemonic = Some(next.to_ascii_lowercase());
                }
                out.push(next);
            }
            None => {}
        }
    }
    (out, mnemonic)
}

// =============================================================================
// Table
// =============================================================================

struct AccelEntry {
    key: AccelKey,
    target: ObjectId,
}

/// Per-window accelerator table. Entries accumulate in insertion order;
/// on a duplicate key the most recently added entry wins.
#[derive(Default)]
pub struct AccelTable {
    entries: Vec<AccelEntry>,
}

impl AccelTable {
    pub fn add(&mut self, key: AccelKey, target: ObjectId) {
        self.entries.push(AccelEntry { key, target });
    }

    pub fn remove_target(&mut self, target: ObjectId) {
        self.entries.retain(|e| e.target != target);
    }

    pub fn match_key(&self, key: AccelKey) -> Option<ObjectId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.target)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_chord() {
        let key = AccelKey::parse("<control>Q").unwrap();
        assert_eq!(key, AccelKey::ctrl('q'));
    }

    #[test]
    fn parses_function_keys() {
        assert_eq!(
            AccelKey::parse("F5"),
            Some(AccelKey {
                base: BaseKey::F(5),
                control: false
            })
        );
        assert_eq!(AccelKey::parse("F13"), None);
        assert_eq!(AccelKey::parse("<control>F2").map(|k| k.control), Some(true));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(AccelKey::parse(""), None);
        assert_eq!(AccelKey::parse("ctrl+q"), None);
    }

    #[test]
    fn mnemonic_round_trip() {
        let (text, mnemonic) = strip_mnemonic("_New");
        assert_eq!(text, "New");
        assert_eq!(mnemonic, Some('n'));
        // The stripped label re-parses as the bare accelerator key.
        let key = AccelKey::parse(&mnemonic.unwrap().to_string()).unwrap();
        assert_eq!(key.base, BaseKey::Char('n'));
    }

    #[test]
    fn double_underscore_is_literal() {
        let (text, mnemonic) = strip_mnemonic("Save__As");
        assert_eq!(text, "Save_As");
        assert_eq!(mnemonic, None);
    }

    #[test]
    fn last_added_binding_wins() {
        let mut table = AccelTable::default();
        let a = ObjectId(1);
        let b = ObjectId(2);
        table.add(AccelKey::ctrl('s'), a);
        table.add(AccelKey::ctrl('s'), b);
        assert_eq!(table.match_key(AccelKey::ctrl('s')), Some(b));
        table.remove_target(b);
        assert_eq!(table.match_key(AccelKey::ctrl('s')), Some(a));
    }
}
