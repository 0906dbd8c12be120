//! Filename template resolution.
//!
//! DASH segment templates name files with `$Name$` placeholders, optionally
//! carrying a printf-style format: `chunk-stream$RepresentationID$-$Number%05d$.m4s`.
//! `$$` stands for a literal `$`.
//!
//! A formatted placeholder goes through three steps, first match wins:
//!
//! 1. numeric: the value reads as an integer and the format is a numeric
//!    conversion (`d i u x X o f F e E g G`),
//! 2. raw: the format is a string conversion (`s`), applied to the value text,
//! 3. plain: the value text as is.
//!
//! Literal text after the conversion is kept, so `$Number%05dxyz$` gives
//! `00003xyz`. An unusable format never fails resolution. An unbound name
//! always does.

use crate::error::TemplateError;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Placeholder name for the representation identifier.
pub const REPRESENTATION_ID: &str = "RepresentationID";

/// Placeholder name for the segment number.
pub const NUMBER: &str = "Number";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$(?P<name>[A-Za-z0-9_]+)(?P<fmt>%[^$]+)?\$")
        .expect("placeholder pattern is valid")
});

/// A value bound to a placeholder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// Integer form of the value, if it has one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(n.to_string()))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Values available to a template during resolution.
///
/// # Example
///
/// ```
/// use clipexport_dash::template::{resolve, Bindings};
///
/// let bindings = Bindings::for_segment(1, 42);
/// let name = resolve("chunk-stream$RepresentationID$-$Number%05d$.m4s", &bindings)?;
/// assert_eq!(name, "chunk-stream1-00042.m4s");
/// # Ok::<(), clipexport_dash::error::TemplateError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for names that only depend on the representation.
    pub fn for_representation(id: u32) -> Self {
        Self::new().with(REPRESENTATION_ID, id)
    }

    /// Bindings for one media segment of a representation.
    pub fn for_segment(id: u32, number: u64) -> Self {
        Self::for_representation(id).with(NUMBER, number)
    }

    /// Bind a value.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Bind a value in place.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Look up a bound value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Resolve every placeholder in `template`.
pub fn resolve(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        out.push_str(&substitute(&caps, bindings)?);
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn substitute(caps: &Captures<'_>, bindings: &Bindings) -> Result<String, TemplateError> {
    let Some(name) = caps.name("name") else {
        return Ok("$".to_string());
    };

    let value = bindings
        .get(name.as_str())
        .ok_or_else(|| TemplateError::MissingBinding {
            name: name.as_str().to_string(),
        })?;

    Ok(match caps.name("fmt") {
        Some(fmt) => apply_format(fmt.as_str(), value),
        None => value.to_string(),
    })
}

/// Apply a printf-style format to a value using the numeric, raw, plain chain.
pub fn apply_format(format: &str, value: &Value) -> String {
    format_numeric(format, value)
        .or_else(|| format_raw(format, value))
        .unwrap_or_else(|| value.to_string())
}

/// Format the value as an integer, if both value and format allow it.
pub fn format_numeric(format: &str, value: &Value) -> Option<String> {
    let n = value.as_int()?;
    FormatSpec::parse(format)?.format_number(n)
}

/// Format the value text with a string conversion.
pub fn format_raw(format: &str, value: &Value) -> Option<String> {
    FormatSpec::parse(format)?.format_str(&value.to_string())
}

/// A filename template with its placeholder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
}

impl FilenameTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.source)
            .filter_map(|c| c.name("name").map(|m| m.as_str()))
            .collect()
    }

    /// Whether the template references `name`.
    pub fn references(&self, name: &str) -> bool {
        self.placeholders().contains(&name)
    }

    pub fn resolve(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        resolve(&self.source, bindings)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parsed `%[flags][width][.precision][length]conversion[literal]` format.
///
/// Text after the conversion is kept literally, with `%%` read as `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
    suffix: String,
}

impl FormatSpec {
    fn parse(format: &str) -> Option<Self> {
        let mut chars = format.strip_prefix('%')?.chars().peekable();
        let mut spec = FormatSpec {
            left: false,
            zero: false,
            plus: false,
            space: false,
            alternate: false,
            width: 0,
            precision: None,
            conversion: 'd',
            suffix: String::new(),
        };

        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            chars.next();
        }

        spec.width = take_number(&mut chars).unwrap_or(0);

        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        while matches!(chars.peek(), Some('h' | 'l' | 'L')) {
            chars.next();
        }

        spec.conversion = chars.next()?;

        // A second conversion would need a second value
        while let Some(c) = chars.next() {
            if c == '%' && chars.next() != Some('%') {
                return None;
            }
            spec.suffix.push(c);
        }

        Some(spec)
    }

    fn format_number(&self, n: i64) -> Option<String> {
        match self.conversion {
            'd' | 'i' | 'u' | 'x' | 'X' | 'o' => self.format_int(n),
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => self.format_float(n as f64),
            _ => None,
        }
    }

    fn format_int(&self, n: i64) -> Option<String> {
        let magnitude = n.unsigned_abs();
        let (mut digits, prefix) = match self.conversion {
            'd' | 'i' | 'u' => (magnitude.to_string(), ""),
            'x' => (format!("{:x}", magnitude), if self.alternate { "0x" } else { "" }),
            'X' => (format!("{:X}", magnitude), if self.alternate { "0X" } else { "" }),
            'o' => (format!("{:o}", magnitude), if self.alternate { "0o" } else { "" }),
            _ => return None,
        };

        if let Some(precision) = self.precision {
            if digits.len() < precision {
                digits = format!("{}{}", "0".repeat(precision - digits.len()), digits);
            }
        }

        Some(self.pad(self.sign(n < 0), prefix, &digits))
    }

    fn format_float(&self, v: f64) -> Option<String> {
        let precision = self.precision.unwrap_or(6);
        let magnitude = v.abs();
        let upper = self.conversion.is_ascii_uppercase();

        let mut digits = match self.conversion.to_ascii_lowercase() {
            'f' => format!("{:.*}", precision, magnitude),
            'e' => exponent_form(magnitude, precision, upper),
            'g' => {
                let significant = precision.max(1);
                let exponent = decimal_exponent(magnitude, significant - 1);
                let mut text = if (-4..significant as i32).contains(&exponent) {
                    let decimals = (significant as i32 - 1 - exponent) as usize;
                    format!("{:.*}", decimals, magnitude)
                } else {
                    exponent_form(magnitude, significant - 1, upper)
                };
                if !self.alternate {
                    text = strip_fraction_zeros(&text);
                }
                text
            }
            _ => return None,
        };

        if self.alternate && precision == 0 && !digits.contains('.') {
            match digits.find(|c| c == 'e' || c == 'E') {
                Some(at) => digits.insert(at, '.'),
                None => digits.push('.'),
            }
        }

        Some(self.pad(self.sign(v < 0.0), "", &digits))
    }

    fn format_str(&self, s: &str) -> Option<String> {
        if self.conversion != 's' {
            return None;
        }

        let text: String = match self.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.to_string(),
        };
        let fill = self.width.saturating_sub(text.chars().count());

        let body = if self.left {
            format!("{}{}", text, " ".repeat(fill))
        } else {
            format!("{}{}", " ".repeat(fill), text)
        };
        Some(body + &self.suffix)
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }

    /// Apply width and fill, then the literal suffix.
    fn pad(&self, sign: &str, prefix: &str, digits: &str) -> String {
        let body_len = sign.len() + prefix.len() + digits.len();
        let fill = self.width.saturating_sub(body_len);
        let body = if self.left {
            format!("{}{}{}{}", sign, prefix, digits, " ".repeat(fill))
        } else if self.zero {
            format!("{}{}{}{}", sign, prefix, "0".repeat(fill), digits)
        } else {
            format!("{}{}{}{}", " ".repeat(fill), sign, prefix, digits)
        };
        body + &self.suffix
    }
}

/// `mantissa e±XX` with at least two exponent digits.
fn exponent_form(v: f64, precision: usize, upper: bool) -> String {
    let text = format!("{:.*e}", precision, v);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.unsigned_abs()
    )
}

/// Decimal exponent of `v` once rounded to `precision` fraction digits.
fn decimal_exponent(v: f64, precision: usize) -> i32 {
    let text = format!("{:.*e}", precision, v);
    text.split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

fn strip_fraction_zeros(text: &str) -> String {
    let (number, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };
    let number = if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    };
    format!("{}{}", number, exponent)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    value
}
