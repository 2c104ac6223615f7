//! Page label decoding.
//!
//! A document's numbering metadata is a set of ranges, each starting at a
//! physical page index and carrying a style, an optional prefix and a first
//! ordinal. A page's ordinal is `index - range.start + range.first_ordinal`,
//! rendered by its range's [`PageLabelStyle`].

use std::fmt;

/// Numbering style of a label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageLabelStyle {
    /// 1, 2, 3
    Decimal,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// a, b, ..., z, aa, ab
    LowerAlpha,
    /// A, B, ..., Z, AA, AB
    UpperAlpha,
    /// Prefix only
    NoStyle,
}

impl PageLabelStyle {
    /// Map a PDF `/S` name (`D`, `r`, `R`, `a`, `A`) to a style.
    pub fn from_pdf_name(name: &[u8]) -> Self {
        match name {
            b"D" => PageLabelStyle::Decimal,
            b"r" => PageLabelStyle::LowerRoman,
            b"R" => PageLabelStyle::UpperRoman,
            b"a" => PageLabelStyle::LowerAlpha,
            b"A" => PageLabelStyle::UpperAlpha,
            _ => PageLabelStyle::NoStyle,
        }
    }

    /// Render an ordinal in this style. Ordinal 0 has no roman or alphabetic form.
    /// Roman ordinals above [`MAX_ROMAN_ORDINAL`] render as decimal.
    pub fn render(self, ordinal: usize) -> String {
        match self {
            PageLabelStyle::Decimal => ordinal.to_string(),
            PageLabelStyle::LowerRoman | PageLabelStyle::UpperRoman
                if ordinal > MAX_ROMAN_ORDINAL =>
            {
                ordinal.to_string()
            }
            PageLabelStyle::LowerRoman => to_roman(ordinal).to_ascii_lowercase(),
            PageLabelStyle::UpperRoman => to_roman(ordinal),
            PageLabelStyle::LowerAlpha => to_alpha(ordinal),
            PageLabelStyle::UpperAlpha => to_alpha(ordinal).to_ascii_uppercase(),
            PageLabelStyle::NoStyle => String::new(),
        }
    }

    /// Inverse of [`render`](Self::render). Only canonical renderings parse.
    pub fn parse(self, label: &str) -> Option<usize> {
        match self {
            PageLabelStyle::Decimal => {
                if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                label.parse().ok()
            }
            PageLabelStyle::LowerRoman => {
                if label.bytes().any(|b| b.is_ascii_uppercase()) {
                    return None;
                }
                from_roman(&label.to_ascii_uppercase())
            }
            PageLabelStyle::UpperRoman => from_roman(label),
            PageLabelStyle::LowerAlpha => from_alpha(label, b'a'),
            PageLabelStyle::UpperAlpha => from_alpha(label, b'A'),
            PageLabelStyle::NoStyle => None,
        }
    }
}

impl fmt::Display for PageLabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageLabelStyle::Decimal => "decimal",
            PageLabelStyle::LowerRoman => "lower-roman",
            PageLabelStyle::UpperRoman => "upper-roman",
            PageLabelStyle::LowerAlpha => "lower-alpha",
            PageLabelStyle::UpperAlpha => "upper-alpha",
            PageLabelStyle::NoStyle => "none",
        };
        f.write_str(name)
    }
}

/// Largest ordinal rendered in roman numerals.
pub const MAX_ROMAN_ORDINAL: usize = 9_999;

const ROMAN: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Uppercase subtractive roman numeral. Thousands repeat `M` past 3999;
/// callers bound the input with [`MAX_ROMAN_ORDINAL`].
pub fn to_roman(mut n: usize) -> String {
    let mut out = String::new();
    for (value, symbol) in ROMAN {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Parse an uppercase roman numeral, rejecting non-canonical forms like `IIII`.
pub fn from_roman(s: &str) -> Option<usize> {
    if s.is_empty() {
        return None;
    }

    let digit = |c: u8| match c {
        b'I' => Some(1usize),
        b'V' => Some(5),
        b'X' => Some(10),
        b'L' => Some(50),
        b'C' => Some(100),
        b'D' => Some(500),
        b'M' => Some(1000),
        _ => None,
    };

    let values = s.bytes().map(digit).collect::<Option<Vec<_>>>()?;
    let mut total = 0usize;
    let mut iter = values.iter().peekable();
    while let Some(&value) = iter.next() {
        match iter.peek() {
            Some(&&next) if next > value => {
                total = total.checked_add(next - value)?;
                iter.next();
            }
            _ => total = total.checked_add(value)?,
        }
    }

    (to_roman(total) == s).then_some(total)
}

/// Bijective base-26 in lowercase: 1 -> a, 26 -> z, 27 -> aa.
pub fn to_alpha(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    out.iter().rev().collect()
}

fn from_alpha(s: &str, base: u8) -> Option<usize> {
    if s.is_empty() {
        return None;
    }
    s.bytes().try_fold(0usize, |acc, b| {
        if !(base..base + 26).contains(&b) {
            return None;
        }
        acc.checked_mul(26)?.checked_add(usize::from(b - base) + 1)
    })
}

/// One numbering range: pages from `start` up to the next range's start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRange {
    /// First physical page index covered
    pub start: usize,
    pub style: PageLabelStyle,
    pub prefix: String,
    /// Ordinal of the first page in the range (PDF `/St`, default 1)
    pub first_ordinal: usize,
}

impl LabelRange {
    pub fn new(start: usize, style: PageLabelStyle) -> Self {
        Self {
            start,
            style,
            prefix: String::new(),
            first_ordinal: 1,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn starting_at(mut self, first_ordinal: usize) -> Self {
        self.first_ordinal = first_ordinal;
        self
    }

    fn label(&self, index: usize) -> String {
        let ordinal = (index - self.start).saturating_add(self.first_ordinal);
        match self.style {
            PageLabelStyle::NoStyle => self.prefix.clone(),
            style => format!("{}{}", self.prefix, style.render(ordinal)),
        }
    }
}

/// A document's page numbering scheme. Empty when the document defines none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageNumbering {
    ranges: Vec<LabelRange>,
}

impl PageNumbering {
    /// Build from ranges in any order. When two ranges share a start, the
    /// later one wins.
    pub fn new(mut ranges: Vec<LabelRange>) -> Self {
        ranges.reverse();
        ranges.sort_by_key(|r| r.start);
        ranges.dedup_by_key(|r| r.start);
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[LabelRange] {
        &self.ranges
    }

    /// Label of a physical page, or `None` when no range covers it.
    pub fn label_for(&self, index: usize) -> Option<String> {
        let pos = self.ranges.partition_point(|r| r.start <= index);
        let range = self.ranges.get(pos.checked_sub(1)?)?;
        let label = range.label(index);
        (!label.is_empty()).then_some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_roman_rendering() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_roman(3999), "MMMCMXCIX");
        assert_eq!(to_roman(0), "");
        assert_eq!(PageLabelStyle::LowerRoman.render(4), "iv");
    }

    #[test]
    fn test_huge_roman_ordinal_renders_decimal() {
        assert_eq!(PageLabelStyle::UpperRoman.render(9_999), "MMMMMMMMMCMXCIX");
        assert_eq!(PageLabelStyle::UpperRoman.render(10_000), "10000");

        let range = LabelRange::new(0, PageLabelStyle::UpperRoman).starting_at(10_000_000_000);
        let numbering = PageNumbering::new(vec![range]);
        assert_eq!(numbering.label_for(0).as_deref(), Some("10000000000"));
        assert_eq!(numbering.label_for(1).as_deref(), Some("10000000001"));

        let range = LabelRange::new(0, PageLabelStyle::LowerRoman).starting_at(usize::MAX);
        assert_eq!(
            PageNumbering::new(vec![range]).label_for(3),
            Some(usize::MAX.to_string())
        );
    }

    #[test]
    fn test_roman_rejects_non_canonical() {
        assert_eq!(from_roman("IIII"), None);
        assert_eq!(from_roman("IC"), None);
        assert_eq!(from_roman("ABC"), None);
        assert_eq!(from_roman(""), None);
        assert_eq!(from_roman("XLII"), Some(42));
        assert_eq!(PageLabelStyle::LowerRoman.parse("XLII"), None);
        assert_eq!(PageLabelStyle::LowerRoman.parse("xlii"), Some(42));
    }

    #[test]
    fn test_alpha_bijective() {
        assert_eq!(to_alpha(1), "a");
        assert_eq!(to_alpha(26), "z");
        assert_eq!(to_alpha(27), "aa");
        assert_eq!(to_alpha(52), "az");
        assert_eq!(to_alpha(53), "ba");
        assert_eq!(to_alpha(702), "zz");
        assert_eq!(to_alpha(703), "aaa");
        assert_eq!(PageLabelStyle::UpperAlpha.render(28), "AB");
        assert_eq!(PageLabelStyle::UpperAlpha.parse("ab"), None);
    }

    #[test]
    fn test_decimal_parse() {
        assert_eq!(PageLabelStyle::Decimal.parse("12"), Some(12));
        assert_eq!(PageLabelStyle::Decimal.parse("+12"), None);
        assert_eq!(PageLabelStyle::Decimal.parse(""), None);
    }

    #[test]
    fn test_pdf_style_names() {
        assert_eq!(PageLabelStyle::from_pdf_name(b"r"), PageLabelStyle::LowerRoman);
        assert_eq!(PageLabelStyle::from_pdf_name(b"D"), PageLabelStyle::Decimal);
        assert_eq!(PageLabelStyle::from_pdf_name(b"Q"), PageLabelStyle::NoStyle);
    }

    #[test]
    fn test_numbering_front_matter_then_body() {
        let numbering = PageNumbering::new(vec![
            LabelRange::new(4, PageLabelStyle::Decimal),
            LabelRange::new(0, PageLabelStyle::LowerRoman),
        ]);

        let labels: Vec<_> = (0..7).map(|i| numbering.label_for(i)).collect();
        assert_eq!(
            labels,
            vec![
                Some("i".to_string()),
                Some("ii".to_string()),
                Some("iii".to_string()),
                Some("iv".to_string()),
                Some("1".to_string()),
                Some("2".to_string()),
                Some("3".to_string()),
            ]
        );
    }

    #[test]
    fn test_uncovered_pages_have_no_label() {
        let numbering = PageNumbering::new(vec![LabelRange::new(2, PageLabelStyle::Decimal)]);
        assert_eq!(numbering.label_for(0), None);
        assert_eq!(numbering.label_for(1), None);
        assert_eq!(numbering.label_for(2), Some("1".to_string()));
        assert_eq!(PageNumbering::default().label_for(0), None);
    }

    #[test]
    fn test_prefix_and_start_ordinal() {
        let numbering = PageNumbering::new(vec![
            LabelRange::new(0, PageLabelStyle::Decimal)
                .with_prefix("A-")
                .starting_at(8),
            LabelRange::new(3, PageLabelStyle::NoStyle).with_prefix("Cover"),
            LabelRange::new(4, PageLabelStyle::NoStyle),
        ]);
        assert_eq!(numbering.label_for(0), Some("A-8".to_string()));
        assert_eq!(numbering.label_for(2), Some("A-10".to_string()));
        assert_eq!(numbering.label_for(3), Some("Cover".to_string()));
        assert_eq!(numbering.label_for(4), None);
    }

    #[test]
    fn test_duplicate_start_keeps_last() {
        let numbering = PageNumbering::new(vec![
            LabelRange::new(0, PageLabelStyle::Decimal),
            LabelRange::new(0, PageLabelStyle::UpperRoman),
        ]);
        assert_eq!(numbering.ranges().len(), 1);
        assert_eq!(numbering.label_for(1), Some("II".to_string()));
    }

    #[test]
    fn test_decimal_range_is_gap_free() {
        let numbering =
            PageNumbering::new(vec![LabelRange::new(5, PageLabelStyle::Decimal).starting_at(17)]);
        let ordinals: Vec<usize> = (5..200)
            .map(|i| {
                let label = numbering.label_for(i).unwrap();
                PageLabelStyle::Decimal.parse(&label).unwrap()
            })
            .collect();
        assert!(ordinals.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(ordinals[0], 17);
    }

    proptest! {
        #[test]
        fn roman_round_trip(n in 1usize..=3999) {
            prop_assert_eq!(PageLabelStyle::UpperRoman.parse(&PageLabelStyle::UpperRoman.render(n)), Some(n));
            prop_assert_eq!(PageLabelStyle::LowerRoman.parse(&PageLabelStyle::LowerRoman.render(n)), Some(n));
        }

        #[test]
        fn alpha_round_trip(n in 1usize..=10000) {
            prop_assert_eq!(PageLabelStyle::LowerAlpha.parse(&PageLabelStyle::LowerAlpha.render(n)), Some(n));
            prop_assert_eq!(PageLabelStyle::UpperAlpha.parse(&PageLabelStyle::UpperAlpha.render(n)), Some(n));
        }
    }
}
