/*! Typesetting parameter registers with TeX-style grouping.

  Every [`ParameterKey`] always has a value; [`TypesettingRegisters::begin_group`]
  opens a group, and all local assignments made inside it are undone by the
  matching [`TypesettingRegisters::end_group`]. Global assignments survive all
  enclosing groups, as with TeX's `\global`.

  Like the fields of a TeX state, the registers keep the current values in a flat
  table and a stack of change sets holding the values to restore on group end.
  Reading a value is therefore a plain lookup, independent of the group depth.
  The registers are not thread-safe; keep them confined to one task.
 */

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use khipu_fonts::shaper::Direction;
use crate::dimen::{Dimen, INFTY};
use crate::utils::errors::ConfigError;

/// The fixed set of recognised parameters.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum ParameterKey {
    Language,
    Script,
    TextDirection,
    BaselineSkip,
    LineSkip,
    LineSkipLimit,
    HyphenChar,
    HyphenPenalty,
    MinHyphenLength,
}
impl ParameterKey {
    pub const ALL: [ParameterKey;9] = [
        Self::Language, Self::Script, Self::TextDirection, Self::BaselineSkip, Self::LineSkip,
        Self::LineSkipLimit, Self::HyphenChar, Self::HyphenPenalty, Self::MinHyphenLength
    ];
    pub fn name(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Script => "script",
            Self::TextDirection => "textdirection",
            Self::BaselineSkip => "baselineskip",
            Self::LineSkip => "lineskip",
            Self::LineSkipLimit => "lineskiplimit",
            Self::HyphenChar => "hyphenchar",
            Self::HyphenPenalty => "hyphenpenalty",
            Self::MinHyphenLength => "minhyphenlength",
        }
    }
    fn index(self) -> usize { self as usize }
    fn kind(self) -> ValueKind {
        match self {
            Self::Language | Self::Script => ValueKind::Text,
            Self::TextDirection => ValueKind::Direction,
            Self::BaselineSkip | Self::LineSkip | Self::LineSkipLimit => ValueKind::Dimen,
            Self::HyphenChar => ValueKind::Char,
            Self::HyphenPenalty | Self::MinHyphenLength => ValueKind::Int,
        }
    }
    fn initial(self) -> ParameterValue {
        match self {
            Self::Language => ParameterValue::Text("en_EN".into()),
            Self::Script => ParameterValue::Text("Latin".into()),
            Self::TextDirection => ParameterValue::Direction(Direction::LeftToRight),
            Self::BaselineSkip => ParameterValue::Dimen(Dimen::PT * 12),
            Self::LineSkip | Self::LineSkipLimit => ParameterValue::Dimen(Dimen::ZERO),
            Self::HyphenChar => ParameterValue::Char('-'),
            Self::HyphenPenalty => ParameterValue::Int(0),
            Self::MinHyphenLength => ParameterValue::Int(INFTY),
        }
    }
}
impl FromStr for ParameterKey {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|k| k.name() == lower)
            .ok_or_else(|| ConfigError::UnknownParameter(s.to_string()))
    }
}
impl Display for ParameterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
enum ValueKind { Text, Direction, Dimen, Char, Int }
impl ValueKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Direction => "a text direction",
            Self::Dimen => "a dimension",
            Self::Char => "a character",
            Self::Int => "an integer",
        }
    }
}

#[derive(Clone,Debug,PartialEq,Eq)]
pub enum ParameterValue {
    Text(String),
    Direction(Direction),
    Dimen(Dimen),
    Char(char),
    Int(i32),
}
impl ParameterValue {
    fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Direction(_) => ValueKind::Direction,
            Self::Dimen(_) => ValueKind::Dimen,
            Self::Char(_) => ValueKind::Char,
            Self::Int(_) => ValueKind::Int,
        }
    }
}
impl Display for ParameterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Direction(d) => write!(f,"{:?}",d),
            Self::Dimen(d) => write!(f,"{}",d),
            Self::Char(c) => write!(f,"{}",c),
            Self::Int(i) => write!(f,"{}",i),
        }
    }
}
impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}
impl From<Dimen> for ParameterValue {
    fn from(d: Dimen) -> Self { Self::Dimen(d) }
}
impl From<char> for ParameterValue {
    fn from(c: char) -> Self { Self::Char(c) }
}
impl From<i32> for ParameterValue {
    fn from(i: i32) -> Self { Self::Int(i) }
}
impl From<Direction> for ParameterValue {
    fn from(d: Direction) -> Self { Self::Direction(d) }
}

/** A grouped field needs to be able to push and pop a group. Changes made
  since the last push are reverted on pop.
*/
pub trait GroupedField {
    /// open a new group
    fn push_group(&mut self);
    /// close the innermost group and unroll its local changes
    fn pop_group(&mut self);
}

/// A [`GroupedField`] storing Key-Value-Pairs.
pub trait KeyValueField<K,V>: GroupedField {
    fn get(&self,k:&K) -> &V;
    /// set the value associated with a key locally to the current group
    fn set_locally(&mut self,k:K,v:V);
    /// set the value associated with a key globally
    fn set_globally(&mut self,k:K,v:V);
}

/// Current values of all parameters plus, per open group, the values to restore.
#[derive(Clone,Debug)]
struct ParameterField {
    values: Vec<ParameterValue>,
    changes: Vec<BTreeMap<ParameterKey,ParameterValue>>
}
impl GroupedField for ParameterField {
    fn push_group(&mut self) { self.changes.push(BTreeMap::default()) }
    fn pop_group(&mut self) {
        if let Some(m) = self.changes.pop() {
            for (k,v) in m {
                self.values[k.index()] = v
            }
        }
    }
}
impl KeyValueField<ParameterKey,ParameterValue> for ParameterField {
    fn get(&self, k: &ParameterKey) -> &ParameterValue { &self.values[k.index()] }
    fn set_locally(&mut self, k: ParameterKey, v: ParameterValue) {
        let old = std::mem::replace(&mut self.values[k.index()],v);
        if let Some(m) = self.changes.last_mut() {
            if let Entry::Vacant(e) = m.entry(k) {
                e.insert(old);
            }
        }
    }
    fn set_globally(&mut self, k: ParameterKey, v: ParameterValue) {
        self.values[k.index()] = v;
        for m in self.changes.iter_mut() {
            m.remove(&k);
        }
    }
}

/// The typesetting parameters in effect, with TeX grouping.
#[derive(Clone,Debug)]
pub struct TypesettingRegisters { field: ParameterField }
impl Default for TypesettingRegisters {
    fn default() -> Self { Self::new() }
}
impl TypesettingRegisters {
    pub fn new() -> Self {
        TypesettingRegisters { field: ParameterField {
            values: ParameterKey::ALL.iter().map(|k| k.initial()).collect(),
            changes: Vec::new()
        }}
    }
    /// Nesting depth of groups; 0 at the outermost level.
    pub fn group_level(&self) -> usize { self.field.changes.len() }

    pub fn begin_group(&mut self) {
        self.field.push_group();
        log::trace!(target:"registers","begin group {}",self.group_level());
    }
    /// Closes the innermost group. Without an open group this is a no-op.
    pub fn end_group(&mut self) {
        if self.group_level() == 0 {
            log::warn!(target:"registers","end_group without matching begin_group ignored");
            return
        }
        log::trace!(target:"registers","end group {}",self.group_level());
        self.field.pop_group();
    }

    fn check(key:ParameterKey,value:&ParameterValue) -> Result<(),ConfigError> {
        if key.kind() == value.kind() { Ok(()) } else {
            Err(ConfigError::ParameterType { key:key.name(), expected:key.kind().describe(), got:format!("{:?}",value) })
        }
    }
    /// Sets a parameter for the current group (and groups opened inside it).
    pub fn set<V:Into<ParameterValue>>(&mut self,key:ParameterKey,value:V) -> Result<(),ConfigError> {
        let value = value.into();
        Self::check(key,&value)?;
        log::debug!(target:"registers","{} := {} (level {})",key,value,self.group_level());
        self.field.set_locally(key,value);
        Ok(())
    }
    /// Sets a parameter such that it survives the end of all open groups.
    pub fn set_globally<V:Into<ParameterValue>>(&mut self,key:ParameterKey,value:V) -> Result<(),ConfigError> {
        let value = value.into();
        Self::check(key,&value)?;
        log::debug!(target:"registers","global {} := {}",key,value);
        self.field.set_globally(key,value);
        Ok(())
    }
    /// Sets a parameter given by name, e.g. `"hyphenchar"`.
    pub fn set_named<V:Into<ParameterValue>>(&mut self,name:&str,value:V) -> Result<(),ConfigError> {
        self.set(name.parse()?,value)
    }
    pub fn get(&self,key:ParameterKey) -> &ParameterValue { self.field.get(&key) }
    pub fn get_named(&self,name:&str) -> Result<&ParameterValue,ConfigError> {
        Ok(self.get(name.parse()?))
    }

    fn text(&self,key:ParameterKey) -> &str {
        match self.get(key) { ParameterValue::Text(s) => s, _ => unreachable!("checked on assignment") }
    }
    fn int(&self,key:ParameterKey) -> i32 {
        match self.get(key) { ParameterValue::Int(i) => *i, _ => unreachable!("checked on assignment") }
    }
    fn dimen(&self,key:ParameterKey) -> Dimen {
        match self.get(key) { ParameterValue::Dimen(d) => *d, _ => unreachable!("checked on assignment") }
    }
    pub fn language(&self) -> &str { self.text(ParameterKey::Language) }
    pub fn script(&self) -> &str { self.text(ParameterKey::Script) }
    pub fn text_direction(&self) -> Direction {
        match self.get(ParameterKey::TextDirection) { ParameterValue::Direction(d) => *d, _ => unreachable!("checked on assignment") }
    }
    pub fn baseline_skip(&self) -> Dimen { self.dimen(ParameterKey::BaselineSkip) }
    pub fn line_skip(&self) -> Dimen { self.dimen(ParameterKey::LineSkip) }
    pub fn line_skip_limit(&self) -> Dimen { self.dimen(ParameterKey::LineSkipLimit) }
    pub fn hyphen_char(&self) -> char {
        match self.get(ParameterKey::HyphenChar) { ParameterValue::Char(c) => *c, _ => unreachable!("checked on assignment") }
    }
    pub fn hyphen_penalty(&self) -> i32 { self.int(ParameterKey::HyphenPenalty) }
    pub fn min_hyphen_length(&self) -> i32 { self.int(ParameterKey::MinHyphenLength) }
    /// Hyphenation is on iff the minimum hyphenation length is finite.
    pub fn hyphenation_enabled(&self) -> bool { self.min_hyphen_length() < INFTY }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let regs = TypesettingRegisters::new();
        assert_eq!(regs.language(), "en_EN");
        assert_eq!(regs.script(), "Latin");
        assert_eq!(regs.text_direction(), Direction::LeftToRight);
        assert_eq!(regs.baseline_skip(), Dimen::PT * 12);
        assert_eq!(regs.hyphen_char(), '-');
        assert_eq!(regs.hyphen_penalty(), 0);
        assert!(!regs.hyphenation_enabled());
    }

    #[test]
    fn grouping() {
        let mut regs = TypesettingRegisters::new();
        regs.set(ParameterKey::HyphenPenalty, 50).unwrap();
        regs.begin_group();
        regs.set(ParameterKey::HyphenPenalty, 100).unwrap();
        regs.set(ParameterKey::HyphenPenalty, 200).unwrap();
        regs.begin_group();
        assert_eq!(regs.hyphen_penalty(), 200);
        regs.set(ParameterKey::Language, "de_DE").unwrap();
        assert_eq!(regs.language(), "de_DE");
        regs.end_group();
        assert_eq!(regs.language(), "en_EN");
        assert_eq!(regs.hyphen_penalty(), 200);
        regs.end_group();
        assert_eq!(regs.hyphen_penalty(), 50);
        // unbalanced end_group is ignored
        regs.end_group();
        assert_eq!(regs.hyphen_penalty(), 50);
        assert_eq!(regs.group_level(), 0);
    }

    #[test]
    fn global_assignments_survive_groups() {
        let mut regs = TypesettingRegisters::new();
        regs.begin_group();
        regs.set(ParameterKey::HyphenChar, '=').unwrap();
        regs.begin_group();
        regs.set_globally(ParameterKey::MinHyphenLength, 5).unwrap();
        regs.end_group();
        regs.end_group();
        assert_eq!(regs.min_hyphen_length(), 5);
        assert_eq!(regs.hyphen_char(), '-');
    }

    #[test]
    fn keys_and_types() {
        let mut regs = TypesettingRegisters::new();
        assert_eq!(regs.set_named("nosuchthing", 1), Err(ConfigError::UnknownParameter("nosuchthing".into())));
        assert!(matches!(regs.set(ParameterKey::BaselineSkip, 12), Err(ConfigError::ParameterType{..})));
        regs.set_named("BaselineSkip", Dimen::BP * 14).unwrap();
        assert_eq!(regs.get_named("baselineskip").unwrap(), &ParameterValue::Dimen(Dimen::BP * 14));
        assert_eq!("lineskiplimit".parse::<ParameterKey>().unwrap(), ParameterKey::LineSkipLimit);
    }
}
