/*! Dimensions, represented as a 32-bit integer in *scaled points (sp)*, where
   65536sp = 1bp (a PostScript/PDF big point, 1/72 inch).

   All arithmetic is integer. Conversions between units are lookups into a table
   of pre-computed ratios, see [`UNITS`].
 */

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use crate::utils::errors::ConfigError;

/// A dimension in scaled points.
#[derive(Clone,Copy,Eq,PartialEq,Ord,PartialOrd,Hash,Debug,Default)]
pub struct Dimen(pub i32);

/// The integer standing in for "infinitely large" where a count rather than a
/// dimension is expected (e.g. the minimum hyphenation length that switches
/// hyphenation off).
pub const INFTY: i32 = 100_000_000;

impl Dimen {
    pub const ZERO: Dimen = Dimen(0);
    /// scaled point
    pub const SP: Dimen = Dimen(1);
    /// big point, 1/72 inch
    pub const BP: Dimen = Dimen(65536);
    /// printer's point, 1/72.27 inch
    pub const PT: Dimen = Dimen(65291);
    pub const MM: Dimen = Dimen(185771);
    pub const CM: Dimen = Dimen(1857710);
    pub const IN: Dimen = Dimen(4718592);
    /// pica, 12pt
    pub const PC: Dimen = Dimen(12 * 65291);

    /// First order of infinity. Stretch or shrink of at least this magnitude
    /// makes a line justifiable regardless of its shortfall.
    pub const FIL: Dimen = Dimen(65536 * 10000);
    pub const FILL: Dimen = Dimen(2 * 65536 * 10000);
    pub const FILLL: Dimen = Dimen(3 * 65536 * 10000);

    pub const MAX: Dimen = Dimen(i32::MAX);
    pub const MIN: Dimen = Dimen(i32::MIN);

    pub const fn sp(&self) -> i32 { self.0 }

    /// `self * times / div`, computed without intermediate overflow and
    /// saturating at the bounds of `i32`.
    pub fn scale(&self,times:i32,div:i32) -> Self {
        if div == 0 { return if (self.0 >= 0) == (times >= 0) { Self::MAX } else { Self::MIN } }
        let r = i64::from(self.0) * i64::from(times) / i64::from(div);
        Self(r.clamp(i64::from(i32::MIN),i64::from(i32::MAX)) as i32)
    }
    pub fn saturating_add(self,rhs:Self) -> Self { Self(self.0.saturating_add(rhs.0)) }
    pub fn saturating_sub(self,rhs:Self) -> Self { Self(self.0.saturating_sub(rhs.0)) }
    pub fn abs(self) -> Self { Self(self.0.saturating_abs()) }
    pub fn is_infinite(self) -> bool { self.abs() >= Self::FIL }

    /// This dimension in big points, for output formats expecting floats.
    pub fn points(self) -> f64 { f64::from(self.0) / f64::from(Self::BP.0) }
    pub fn scale_float(self,times:f64) -> Self {
        Self((f64::from(self.0) * times).round() as i32)
    }

    /// Converts `value` given in `unit` (one of [`UNITS`]).
    pub fn from_units(value:i32,unit:&str) -> Result<Self,ConfigError> {
        match unit_ratio(unit) {
            Some(r) => Ok(r.scale(value,1)),
            None => Err(ConfigError::InvalidDimension(format!("{}{}",value,unit)))
        }
    }

    // B-Book §103, with bp in place of pt
    pub(crate) fn display_num(num:i32,unit:&str,f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut val = i64::from(num);
        if val < 0 {
            write!(f,"-")?;
            val = -val;
        }
        write!(f,"{}.",val/65536)?;
        val = 10*(val%65536) + 5;
        let mut delta = 10;
        if val < delta {
            return write!(f,"0{}",unit)
        }
        while val > delta {
            if delta > 65536 { val = val + 32768 - 50000; }
            write!(f,"{}",val/65536)?;
            val = 10*(val%65536);
            delta *= 10;
        }
        write!(f,"{}",unit)
    }
}

/// Recognised units and their size in scaled points.
pub const UNITS: &[(&str,Dimen)] = &[
    ("sp",Dimen::SP),("bp",Dimen::BP),("pt",Dimen::PT),("pc",Dimen::PC),
    ("mm",Dimen::MM),("cm",Dimen::CM),("in",Dimen::IN),
];

fn unit_ratio(unit:&str) -> Option<Dimen> {
    UNITS.iter().find(|(u,_)| *u == unit).map(|(_,d)| *d)
}

impl FromStr for Dimen {
    type Err = ConfigError;
    /// Parses strings like `12pt`, `-2.5mm`, `0.75in` or `100sp`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConfigError::InvalidDimension(s.to_string());
        let s = s.trim();
        let split = s.find(|c:char| c.is_ascii_alphabetic()).ok_or_else(err)?;
        let (number,unit) = s.split_at(split);
        let ratio = unit_ratio(unit.trim()).ok_or_else(err)?;
        let number = number.trim();
        let (negative,number) = match number.strip_prefix('-') {
            Some(rest) => (true,rest),
            None => (false,number.strip_prefix('+').unwrap_or(number))
        };
        let (int,frac) = match number.split_once('.') {
            Some((i,f)) => (i,f),
            None => (number,"")
        };
        if int.is_empty() && frac.is_empty() { return Err(err()) }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) { return Err(err()) }
        let frac = &frac[..frac.len().min(9)];
        let mut mantissa: i64 = 0;
        for c in int.chars().chain(frac.chars()) {
            mantissa = mantissa.checked_mul(10).and_then(|m| m.checked_add(i64::from(c as u8 - b'0'))).ok_or_else(err)?;
        }
        let div = 10i64.pow(frac.len() as u32);
        let sp = mantissa.checked_mul(i64::from(ratio.0)).and_then(|m| m.checked_add(div / 2)).ok_or_else(err)? / div;
        let sp = i32::try_from(sp).map_err(|_| err())?;
        Ok(Dimen(if negative { -sp } else { sp }))
    }
}

impl Add for Dimen {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Dimen(self.0 + rhs.0)
    }
}
impl AddAssign for Dimen {
    fn add_assign(&mut self, rhs: Self) { self.0 += rhs.0 }
}
impl Sub for Dimen {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Dimen(self.0 - rhs.0)
    }
}
impl SubAssign for Dimen {
    fn sub_assign(&mut self, rhs: Self) { self.0 -= rhs.0 }
}
impl Div<i32> for Dimen {
    type Output = Self;
    fn div(self, rhs: i32) -> Self::Output {
        self.scale(1,rhs)
    }
}
impl Mul<i32> for Dimen {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self::Output {
        self.scale(rhs,1)
    }
}
impl Neg for Dimen {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Dimen(-self.0)
    }
}
impl std::iter::Sum for Dimen {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}
impl Display for Dimen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Self::display_num(self.0,"bp",f)
    }
}

/// A point on a page; `y` grows downwards.
#[derive(Clone,Copy,Eq,PartialEq,Hash,Debug,Default)]
pub struct Point { pub x:Dimen, pub y:Dimen }
impl Point {
    pub const ORIGIN: Point = Point { x:Dimen::ZERO, y:Dimen::ZERO };
    pub const fn new(x:Dimen,y:Dimen) -> Self { Point { x, y } }
    pub fn shift(self,dx:Dimen,dy:Dimen) -> Self { Point { x:self.x + dx, y:self.y + dy } }
}
impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output { Point { x:self.x + rhs.x, y:self.y + rhs.y } }
}
impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output { Point { x:self.x - rhs.x, y:self.y - rhs.y } }
}
impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"({},{})",self.x,self.y)
    }
}

/// DIN A4 paper, portrait.
pub const DINA4: Point = Point::new(Dimen(210 * 185771), Dimen(297 * 185771));
/// DIN A5 paper, portrait.
pub const DINA5: Point = Point::new(Dimen(148 * 185771), Dimen(210 * 185771));

/// A rectangle given by two corners. Rectangles need not be normalized, i.e.
/// `top_l` may lie right of or below `bot_r`.
#[derive(Clone,Copy,Eq,PartialEq,Hash,Debug,Default)]
pub struct Rect { pub top_l:Point, pub bot_r:Point }
impl Rect {
    pub const fn new(top_l:Point,bot_r:Point) -> Self { Rect { top_l, bot_r } }
    /// A rectangle of the given size with its top left corner at the origin.
    pub const fn of_size(size:Point) -> Self { Rect { top_l:Point::ORIGIN, bot_r:size } }
    /// Sorts the corners such that `top_l` is the upper left one.
    pub fn normalize(self) -> Self {
        Rect {
            top_l: Point::new(self.top_l.x.min(self.bot_r.x), self.top_l.y.min(self.bot_r.y)),
            bot_r: Point::new(self.top_l.x.max(self.bot_r.x), self.top_l.y.max(self.bot_r.y)),
        }
    }
    pub fn width(&self) -> Dimen { (self.bot_r.x - self.top_l.x).abs() }
    pub fn height(&self) -> Dimen { (self.bot_r.y - self.top_l.y).abs() }
    pub fn contains(&self,p:Point) -> bool {
        let r = self.normalize();
        r.top_l.x <= p.x && p.x <= r.bot_r.x && r.top_l.y <= p.y && p.y <= r.bot_r.y
    }
    pub fn scale_float(&self,times:f64) -> Self {
        Rect {
            top_l: Point::new(self.top_l.x.scale_float(times), self.top_l.y.scale_float(times)),
            bot_r: Point::new(self.bot_r.x.scale_float(times), self.bot_r.y.scale_float(times)),
        }
    }
}
impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"[{} {}]",self.top_l,self.bot_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_table() {
        assert_eq!(Dimen::from_units(1,"in").unwrap(), Dimen::IN);
        assert_eq!(Dimen::from_units(72,"bp").unwrap().0, Dimen::IN.0);
        assert!(Dimen::from_units(1,"em").is_err());
    }

    #[test]
    fn parsing() {
        assert_eq!("12pt".parse::<Dimen>().unwrap(), Dimen::PT * 12);
        assert_eq!("1bp".parse::<Dimen>().unwrap(), Dimen::BP);
        assert_eq!("-2.5bp".parse::<Dimen>().unwrap(), Dimen(-163840));
        assert_eq!(".5bp".parse::<Dimen>().unwrap(), Dimen(32768));
        assert_eq!("100 sp".parse::<Dimen>().unwrap(), Dimen(100));
        assert_eq!("1cm".parse::<Dimen>().unwrap(), Dimen::MM * 10);
        assert!("12".parse::<Dimen>().is_err());
        assert!("twelve pt".parse::<Dimen>().is_err());
        assert!("12furlong".parse::<Dimen>().is_err());
        assert!(matches!("999999999999999bp".parse::<Dimen>(), Err(ConfigError::InvalidDimension(s)) if s == "999999999999999bp"));
        assert!("40000bp".parse::<Dimen>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Dimen::BP.to_string(), "1.0bp");
        assert_eq!((Dimen::BP * 5 / 2).to_string(), "2.5bp");
        assert_eq!((-Dimen::BP).to_string(), "-1.0bp");
        assert_eq!(Dimen::ZERO.to_string(), "0.0bp");
    }

    #[test]
    fn scaling_saturates() {
        assert_eq!(Dimen::FILLL.scale(2,1), Dimen::MAX);
        assert_eq!(Dimen::BP.scale(3,2), Dimen(98304));
        assert!(Dimen::FIL.is_infinite());
        assert!(!Dimen::IN.is_infinite());
    }

    #[test]
    fn rectangles() {
        let r = Rect::new(Point::new(Dimen(10),Dimen(20)),Point::new(Dimen(0),Dimen(5)));
        let n = r.normalize();
        assert_eq!(n.top_l, Point::new(Dimen(0),Dimen(5)));
        assert_eq!(n.bot_r, Point::new(Dimen(10),Dimen(20)));
        assert_eq!(r.width(), Dimen(10));
        assert_eq!(r.height(), Dimen(15));
        assert!(r.contains(Point::new(Dimen(5),Dimen(10))));
        assert!(!r.contains(Point::new(Dimen(11),Dimen(10))));
        assert_eq!(DINA4.x, Dimen::MM * 210);
    }
}
