/*! Hyphenation dictionaries.

   A [`HyphenationDictionary`] splits a single word into syllables. The
   [`Hyphenator`] resolves language tags like `en_EN` or `de-DE` to
   dictionaries: explicitly registered ones first, then the pattern based
   dictionaries shipped with [`hypher`].
 */

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use crate::utils::HMap;
use crate::utils::errors::ConfigError;

/// TeX's `\lefthyphenmin`: minimal number of characters before a hyphen.
pub const LEFT_HYPHEN_MIN: usize = 2;
/// TeX's `\righthyphenmin`: minimal number of characters after a hyphen.
pub const RIGHT_HYPHEN_MIN: usize = 3;

pub trait HyphenationDictionary: Send + Sync {
    /// The language tag the dictionary was resolved for.
    fn language(&self) -> &str;
    /// The syllables of `word`; their concatenation is `word`. A word that
    /// cannot be hyphenated yields a single syllable.
    fn syllables<'w>(&self,word:&'w str) -> Vec<&'w str>;
}

/// The primary subtag of a language tag, lowercased: `en_EN` → `en`.
pub fn primary_subtag(tag:&str) -> String {
    tag.split(['_','-']).next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Liang patterns from [`hypher`].
#[derive(Clone,Debug)]
pub struct HypherDictionary {
    language:String,
    lang:hypher::Lang,
}
impl HypherDictionary {
    /// The dictionary for a language tag; `None` if `hypher` has no patterns for it.
    pub fn for_tag(tag:&str) -> Option<Self> {
        let sub = primary_subtag(tag);
        let bytes:[u8;2] = sub.as_bytes().try_into().ok()?;
        hypher::Lang::from_iso(bytes).map(|lang| HypherDictionary { language:tag.to_string(), lang })
    }
}
impl HyphenationDictionary for HypherDictionary {
    fn language(&self) -> &str { &self.language }
    fn syllables<'w>(&self, word: &'w str) -> Vec<&'w str> {
        hypher::hyphenate(word,self.lang).collect()
    }
}

/// Explicit hyphenations, as with TeX's `\hyphenation{Aus-nah-me}`, falling
/// back to another dictionary for all other words. Lookup ignores case.
#[derive(Clone)]
pub struct ExceptionDictionary {
    language:String,
    /// lowercased word → character positions of the hyphens
    exceptions:HMap<String,Vec<usize>>,
    fallback:Option<Arc<dyn HyphenationDictionary>>,
}
impl Debug for ExceptionDictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"ExceptionDictionary({}, {} entries)",self.language,self.exceptions.len())
    }
}
impl ExceptionDictionary {
    pub fn new(language:&str,fallback:Option<Arc<dyn HyphenationDictionary>>) -> Self {
        ExceptionDictionary { language:language.to_string(), exceptions:HMap::default(), fallback }
    }
    /// Adds an exception given with hyphens, e.g. `"Aus-nah-me"`.
    pub fn add(&mut self,pattern:&str) -> &mut Self {
        let mut word = String::new();
        let mut cuts = Vec::new();
        let mut chars = 0;
        for c in pattern.chars() {
            if c == '-' { cuts.push(chars) } else {
                word.extend(c.to_lowercase());
                chars += 1;
            }
        }
        cuts.retain(|c| *c > 0 && *c < chars);
        cuts.dedup();
        log::trace!(target:"hyphenation","exception {} → {:?}",word,cuts);
        self.exceptions.insert(word,cuts);
        self
    }
    pub fn len(&self) -> usize { self.exceptions.len() }
    pub fn is_empty(&self) -> bool { self.exceptions.is_empty() }
}
impl HyphenationDictionary for ExceptionDictionary {
    fn language(&self) -> &str { &self.language }
    fn syllables<'w>(&self, word: &'w str) -> Vec<&'w str> {
        let lower:String = word.chars().flat_map(char::to_lowercase).collect();
        match self.exceptions.get(&lower) {
            Some(cuts) if lower.chars().count() == word.chars().count() => {
                let mut ret = Vec::with_capacity(cuts.len() + 1);
                let mut last = 0;
                for (i,(byte,_)) in word.char_indices().enumerate() {
                    if cuts.contains(&i) {
                        ret.push(&word[last..byte]);
                        last = byte;
                    }
                }
                ret.push(&word[last..]);
                ret
            }
            _ => match &self.fallback {
                Some(d) => d.syllables(word),
                None => vec![word]
            }
        }
    }
}

/// Resolves language tags to dictionaries.
#[derive(Clone,Default)]
pub struct Hyphenator {
    registered:HMap<String,Arc<dyn HyphenationDictionary>>,
}
impl Debug for Hyphenator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.registered.keys()).finish()
    }
}
impl Hyphenator {
    pub fn new() -> Self { Hyphenator::default() }
    /// Registers a dictionary for all tags with the same primary subtag as `tag`,
    /// taking precedence over the built-in patterns.
    pub fn register(&mut self,tag:&str,dictionary:Arc<dyn HyphenationDictionary>) -> &mut Self {
        self.registered.insert(primary_subtag(tag),dictionary);
        self
    }
    /// The dictionary for `tag`.
    pub fn dictionary(&self,tag:&str) -> Result<Arc<dyn HyphenationDictionary>,ConfigError> {
        if let Some(d) = self.registered.get(&primary_subtag(tag)) {
            return Ok(d.clone())
        }
        match HypherDictionary::for_tag(tag) {
            Some(d) => Ok(Arc::new(d)),
            None => Err(ConfigError::UnknownLanguage(tag.to_string()))
        }
    }
    /// The syllables of `word` in language `tag`, keeping at least
    /// [`LEFT_HYPHEN_MIN`] characters before the first and [`RIGHT_HYPHEN_MIN`]
    /// after the last hyphen.
    pub fn hyphenate<'w>(&self,tag:&str,word:&'w str) -> Result<Vec<&'w str>,ConfigError> {
        Ok(bounded(self.dictionary(tag)?.syllables(word),word))
    }
}

/// Merges syllables violating [`LEFT_HYPHEN_MIN`] and [`RIGHT_HYPHEN_MIN`].
pub(crate) fn bounded<'w>(syllables:Vec<&'w str>,word:&'w str) -> Vec<&'w str> {
    let total = word.chars().count();
    let mut cuts = Vec::new();
    let (mut bytes,mut chars) = (0,0);
    for s in &syllables {
        bytes += s.len();
        chars += s.chars().count();
        if chars >= LEFT_HYPHEN_MIN && total.saturating_sub(chars) >= RIGHT_HYPHEN_MIN && bytes < word.len() {
            cuts.push(bytes)
        }
    }
    let mut ret = Vec::with_capacity(cuts.len() + 1);
    let mut last = 0;
    for c in cuts {
        ret.push(&word[last..c]);
        last = c;
    }
    ret.push(&word[last..]);
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(primary_subtag("en_EN"), "en");
        assert_eq!(primary_subtag("de-DE"), "de");
        assert_eq!(primary_subtag("FR"), "fr");
    }

    #[test]
    fn builtin_patterns() {
        let h = Hyphenator::new();
        let syllables = h.hyphenate("en_EN", "extraordinary").unwrap();
        assert!(syllables.len() >= 2);
        assert_eq!(syllables.concat(), "extraordinary");
        assert_eq!(h.dictionary("de_DE").unwrap().language(), "de_DE");
    }

    #[test]
    fn unknown_language() {
        let h = Hyphenator::new();
        assert_eq!(h.dictionary("xx_XX").err(), Some(ConfigError::UnknownLanguage("xx_XX".into())));
        assert!(h.hyphenate("klingon", "Qapla").is_err());
    }

    #[test]
    fn exceptions() {
        let mut ex = ExceptionDictionary::new("de_DE", None);
        ex.add("Aus-nah-me");
        assert_eq!(ex.syllables("Ausnahme"), vec!["Aus", "nah", "me"]);
        assert_eq!(ex.syllables("AUSNAHME"), vec!["AUS", "NAH", "ME"]);
        assert_eq!(ex.syllables("Regel"), vec!["Regel"]);
        let mut h = Hyphenator::new();
        h.register("de", Arc::new(ex));
        // "me" is too short to stand on its own after a hyphen
        assert_eq!(h.hyphenate("de_DE", "Ausnahme").unwrap(), vec!["Aus", "nahme"]);
    }

    #[test]
    fn bounds() {
        assert_eq!(bounded(vec!["a", "bout"], "about"), vec!["about"]);
        assert_eq!(bounded(vec!["hel", "lo"], "hello"), vec!["hello"]);
        assert_eq!(bounded(vec!["ta", "ble", "cloth"], "tablecloth"), vec!["ta", "ble", "cloth"]);
    }
}
