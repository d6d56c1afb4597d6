//! Client locales and per-locale text tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of locale slots
pub const TOTAL_LOCALES: usize = 12;

pub const DEFAULT_LOCALE: Locale = Locale::EnUs;

/// Client locale; the discriminant is the slot index used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Locale {
    EnUs = 0,
    KoKr = 1,
    FrFr = 2,
    DeDe = 3,
    ZhCn = 4,
    ZhTw = 5,
    EsEs = 6,
    EsMx = 7,
    RuRu = 8,
    /// Placeholder slot; rows may still name it
    None = 9,
    PtBr = 10,
    ItIt = 11,
}

impl Locale {
    pub const ALL: [Locale; TOTAL_LOCALES] = [
        Locale::EnUs,
        Locale::KoKr,
        Locale::FrFr,
        Locale::DeDe,
        Locale::ZhCn,
        Locale::ZhTw,
        Locale::EsEs,
        Locale::EsMx,
        Locale::RuRu,
        Locale::None,
        Locale::PtBr,
        Locale::ItIt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::EnUs => "enUS",
            Locale::KoKr => "koKR",
            Locale::FrFr => "frFR",
            Locale::DeDe => "deDE",
            Locale::ZhCn => "zhCN",
            Locale::ZhTw => "zhTW",
            Locale::EsEs => "esES",
            Locale::EsMx => "esMX",
            Locale::RuRu => "ruRU",
            Locale::None => "none",
            Locale::PtBr => "ptBR",
            Locale::ItIt => "itIT",
        }
    }

    /// Resolve a locale name as stored in data rows (`"deDE"`, `"ptBR"`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.as_str() == name)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_default(&self) -> bool {
        *self == DEFAULT_LOCALE
    }
}

/// One string per locale slot; an empty slot means "no text for this locale".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct LocalizedText {
    slots: [String; TOTAL_LOCALES],
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` for `locale`. Empty text never overwrites a slot.
    pub fn set(&mut self, locale: Locale, text: &str) {
        if text.is_empty() {
            return;
        }
        self.slots[locale.index()] = text.to_string();
    }

    /// Text for `locale`, if that slot was ever filled
    pub fn get(&self, locale: Locale) -> Option<&str> {
        let text = &self.slots[locale.index()];
        (!text.is_empty()).then_some(text.as_str())
    }

    /// Text for the default locale, or an empty string
    pub fn default_text(&self) -> &str {
        &self.slots[DEFAULT_LOCALE.index()]
    }

    /// Replace `value` with this table's text for `locale` when present
    pub fn resolve_into(&self, locale: Locale, value: &mut String) {
        if let Some(text) = self.get(locale) {
            value.clear();
            value.push_str(text);
        }
    }
}

impl TryFrom<BTreeMap<String, String>> for LocalizedText {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut text = LocalizedText::new();
        for (name, value) in map {
            let locale = Locale::from_name(&name).ok_or_else(|| format!("unknown locale '{}'", name))?;
            text.set(locale, &value);
        }
        Ok(text)
    }
}
