//! XPM (X PixMap) decoder.
//!
//! XPM files are C source: a header string, a color table, and one quoted
//! string per pixel row, possibly surrounded by declarations and block
//! comments. Only the quoted strings matter. They are pulled out in order,
//! the header fixes how many color entries and rows follow, and everything
//! after the last row is ignored.
//!
//! Color specifications go through a [`ColorResolver`]. The default
//! [`X11ColorResolver`] understands the hex and `rgb:` forms plus the common
//! X11 color names.

use std::io::Read;
use std::path::Path;

use crate::buffer::{PixelBuffer, Rgb};
use crate::{PixbufError, Result};

const MAX_WIDTH: u32 = 32767;
const MAX_HEIGHT: u32 = 32767;
const MAX_COLORS: u32 = 32766;
const MAX_CPP: u32 = 5;

/// Codes for the lookup-table fast path are printable ASCII, `32..=127`.
const LUT_SPAN: usize = 128 - 32;

/// Limits applied while decoding.
///
/// The defaults are the hard limits of the format. Larger values do not
/// loosen them: the effective limit is the smaller of the option and the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpmOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub max_colors: u32,
    /// Characters per pixel
    pub max_cpp: u32,
}

impl Default for XpmOptions {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            max_colors: MAX_COLORS,
            max_cpp: MAX_CPP,
        }
    }
}

/// Turns a color specification from an XPM color table into RGB.
///
/// `"None"` never reaches the resolver; the decoder handles transparency
/// itself.
pub trait ColorResolver {
    fn resolve(&self, spec: &str) -> Option<Rgb>;
}

impl<F> ColorResolver for F
where
    F: Fn(&str) -> Option<Rgb>,
{
    fn resolve(&self, spec: &str) -> Option<Rgb> {
        self(spec)
    }
}

/// Resolves colors the way an X server parses them.
///
/// - `#RGB`, `#RRGGBB`, `#RRRGGGBBB`, `#RRRRGGGGBBBB`: each field is the
///   high-order bits of a 16-bit value, so `#f00` is `(0xf0, 0, 0)`.
/// - `rgb:R/G/B` with 1 to 4 hex digits per field, scaled to the full range.
/// - Common color names, case-insensitive, spaces ignored (`light gray`).
#[derive(Debug, Clone, Copy, Default)]
pub struct X11ColorResolver;

impl ColorResolver for X11ColorResolver {
    fn resolve(&self, spec: &str) -> Option<Rgb> {
        let spec = spec.trim();
        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hash_color(hex);
        }
        if spec.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("rgb:")) {
            return parse_rgb_device(spec.get(4..)?);
        }
        lookup_color_name(spec)
    }
}

fn parse_hash_color(hex: &str) -> Option<Rgb> {
    let len = hex.len();
    if !matches!(len, 3 | 6 | 9 | 12) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digits = len / 3;
    let shift = 16 - 4 * digits as u32;
    let field = |i: usize| -> Option<u8> {
        let v = u16::from_str_radix(&hex[i * digits..(i + 1) * digits], 16).ok()?;
        Some(((u32::from(v) << shift) >> 8) as u8)
    };
    Some(Rgb::new(field(0)?, field(1)?, field(2)?))
}

fn parse_rgb_device(fields: &str) -> Option<Rgb> {
    let mut parts = fields.split('/');
    let mut next = || -> Option<u8> {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 4 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(part, 16).ok()?;
        let max = (1u32 << (4 * part.len())) - 1;
        Some(((v * 0xffff / max) >> 8) as u8)
    };
    let rgb = Rgb::new(next()?, next()?, next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(rgb)
}

const COLOR_NAMES: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [190, 190, 190]),
    ("darkgray", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("dimgray", [105, 105, 105]),
    ("orange", [255, 165, 0]),
    ("purple", [160, 32, 240]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("navy", [0, 0, 128]),
    ("navyblue", [0, 0, 128]),
    ("maroon", [176, 48, 96]),
    ("gold", [255, 215, 0]),
    ("darkred", [139, 0, 0]),
    ("darkgreen", [0, 100, 0]),
    ("darkblue", [0, 0, 139]),
    ("lightblue", [173, 216, 230]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("forestgreen", [34, 139, 34]),
    ("salmon", [250, 128, 114]),
    ("violet", [238, 130, 238]),
    ("turquoise", [64, 224, 208]),
    ("khaki", [240, 230, 140]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("coral", [255, 127, 80]),
    ("tomato", [255, 99, 71]),
    ("orchid", [218, 112, 214]),
    ("tan", [210, 180, 140]),
    ("wheat", [245, 222, 179]),
    ("gainsboro", [220, 220, 220]),
    ("snow", [255, 250, 250]),
    ("lavender", [230, 230, 250]),
    ("chocolate", [210, 105, 30]),
    ("firebrick", [178, 34, 34]),
    ("sienna", [160, 82, 45]),
];

fn lookup_color_name(name: &str) -> Option<Rgb> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect::<String>()
        .replace("grey", "gray");
    COLOR_NAMES
        .iter()
        .find(|(n, _)| *n == key)
        .map(|&(_, rgb)| Rgb::from(rgb))
}

/// Parses an integer the way `%i` does: decimal, `0x` hex, or leading-zero octal.
fn parse_c_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

/// Pulls quoted strings out of XPM source, skipping block comments.
///
/// Characters inside quotes are clamped into `32..=127`, so control
/// characters read as spaces and every string is ASCII.
struct Strings<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Strings<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// The next quoted string, or `None` at end of input (including inside
    /// an unterminated string or comment).
    fn next_string(&mut self) -> Option<String> {
        let input = self.input;
        loop {
            let c = *input.get(self.pos)?;
            self.pos += 1;
            match c {
                b'/' if input.get(self.pos) == Some(&b'*') => {
                    let body = self.pos + 1;
                    let close = input[body..].windows(2).position(|w| w == b"*/")?;
                    self.pos = body + close + 2;
                }
                b'"' => {
                    let len = input[self.pos..].iter().position(|&b| b == b'"')?;
                    let line = input[self.pos..self.pos + len]
                        .iter()
                        .map(|&b| b.clamp(32, 127) as char)
                        .collect();
                    self.pos += len + 1;
                    return Some(line);
                }
                _ => {}
            }
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<String> {
        self.next_string().ok_or_else(|| {
            log::debug!("xpm: input ended before {what}");
            PixbufError::Parse(format!("unexpected end of input before {what}"))
        })
    }
}

#[derive(Debug)]
struct Header {
    width: u32,
    height: u32,
    ncolors: u32,
    cpp: u32,
}

fn parse_header(line: &str, opts: &XpmOptions) -> Result<Header> {
    let mut fields = line.split_whitespace().map(parse_c_int);
    let mut next = |name: &str| -> Result<i64> {
        fields
            .next()
            .flatten()
            .ok_or_else(|| PixbufError::Parse(format!("bad or missing {name} in header {line:?}")))
    };
    let (width, height, ncolors, cpp) = (next("width")?, next("height")?, next("ncolors")?, next("cpp")?);

    let check = |name: &str, value: i64, limit: u32, default: u32| -> Result<u32> {
        let limit = i64::from(limit.min(default));
        if value <= 0 || value > limit {
            log::debug!("xpm: rejecting header, {name} = {value} (limit {limit})");
            return Err(PixbufError::Parse(format!(
                "{name} {value} outside 1..={limit}"
            )));
        }
        Ok(value as u32)
    };

    Ok(Header {
        width: check("width", width, opts.max_width, MAX_WIDTH)?,
        height: check("height", height, opts.max_height, MAX_HEIGHT)?,
        ncolors: check("ncolors", ncolors, opts.max_colors, MAX_COLORS)?,
        cpp: check("cpp", cpp, opts.max_cpp, MAX_CPP)?,
    })
}

#[derive(Debug, Clone)]
struct ColorEntry {
    code: String,
    color: Rgb,
    transparent: bool,
}

fn is_key(word: &str) -> bool {
    matches!(word, "c" | "m" | "s" | "g" | "g4")
}

fn parse_color_entry(line: &str, cpp: usize, resolver: &dyn ColorResolver) -> Result<ColorEntry> {
    if line.len() < cpp {
        return Err(PixbufError::Parse(format!(
            "color entry {line:?} shorter than {cpp} characters"
        )));
    }
    let (code, rest) = line.split_at(cpp);

    let mut transparent = false;
    let mut visual: Option<Rgb> = None;
    let mut fallback: Option<Rgb> = None;

    let mut apply = |key: Option<&str>, words: &[&str]| {
        let Some(key) = key else { return };
        if words.is_empty() {
            return;
        }
        let spec = words.join(" ");
        if spec.eq_ignore_ascii_case("none") {
            transparent = true;
            return;
        }
        match (key, resolver.resolve(&spec)) {
            ("c", Some(rgb)) => visual = Some(rgb),
            // a later m/s/g/g4 value overrides an earlier one
            (_, Some(rgb)) => fallback = Some(rgb),
            (_, None) => log::warn!("xpm: cannot resolve color {spec:?} for key {key}"),
        }
    };

    let mut key = None;
    let mut words = Vec::new();
    for word in rest.split_whitespace() {
        if is_key(word) {
            apply(key, &words);
            key = Some(word);
            words.clear();
        } else {
            words.push(word);
        }
    }
    apply(key, &words);

    let mut color = match visual.or(fallback) {
        Some(rgb) => rgb,
        None => {
            if !transparent {
                log::warn!("xpm: no usable color for code {code:?}, using black");
            }
            Rgb::BLACK
        }
    };
    // 0xff00ff stays reserved as a transparency sentinel downstream
    if !transparent && color == Rgb::new(255, 0, 255) {
        color.r = 254;
    }

    Ok(ColorEntry {
        code: code.to_owned(),
        color,
        transparent,
    })
}

/// Maps pixel codes to color-table indices.
enum CodeLookup<'a> {
    /// `cpp` of 1 or 2: direct table indexed by the code characters
    Table(Vec<Option<u16>>),
    Scan(&'a [ColorEntry]),
}

impl<'a> CodeLookup<'a> {
    fn build(entries: &'a [ColorEntry], cpp: usize) -> Self {
        if cpp > 2 {
            return Self::Scan(entries);
        }
        let mut table = vec![None; LUT_SPAN * LUT_SPAN];
        for (idx, entry) in entries.iter().enumerate() {
            let slot = &mut table[Self::slot(entry.code.as_bytes())];
            if slot.is_none() {
                *slot = Some(idx as u16);
            }
        }
        Self::Table(table)
    }

    #[inline]
    fn slot(code: &[u8]) -> usize {
        let c0 = usize::from(code[0]) - 32;
        let c1 = code.get(1).map_or(0, |&c| usize::from(c) - 32);
        c0 * LUT_SPAN + c1
    }

    #[inline]
    fn find(&self, code: &[u8]) -> Option<usize> {
        match self {
            Self::Table(table) => table[Self::slot(code)].map(usize::from),
            Self::Scan(entries) => entries.iter().position(|e| e.code.as_bytes() == code),
        }
    }
}

/// Decodes XPM source with the default limits and [`X11ColorResolver`].
///
/// ```rust
/// let xpm = br#"
/// /* XPM */
/// static char *dot[] = {
/// "1 1 1 1",
/// "x c None",
/// "x"
/// };"#;
/// let img = pixbuf::decode_xpm(xpm)?;
/// assert!(img.has_alpha());
/// assert_eq!(img.as_bytes(), &[0, 0, 0, 0]);
/// # Ok::<(), pixbuf::PixbufError>(())
/// ```
pub fn decode_xpm(input: &[u8]) -> Result<PixelBuffer> {
    decode_xpm_with(input, &XpmOptions::default(), &X11ColorResolver)
}

/// Decodes XPM source with explicit limits and color resolution.
///
/// # Errors
///
/// - [`PixbufError::Parse`] for a bad or oversized header, a short color
///   entry, a row shorter than `width * cpp`, an unknown pixel code, or input
///   that ends early.
/// - [`PixbufError::Allocation`] if the pixel storage cannot be obtained.
///   This is deliberately not folded into `Parse`, so callers can tell a
///   corrupt file from memory pressure.
///
/// Pixel storage grows one row at a time as rows are decoded, so a header
/// that promises a huge image costs nothing until its rows actually arrive.
pub fn decode_xpm_with(
    input: &[u8],
    opts: &XpmOptions,
    resolver: &dyn ColorResolver,
) -> Result<PixelBuffer> {
    let mut strings = Strings::new(input);

    let header = parse_header(&strings.expect_string("header")?, opts)?;
    log::debug!(
        "xpm: {}x{}, {} colors, {} chars per pixel",
        header.width,
        header.height,
        header.ncolors,
        header.cpp
    );
    let cpp = header.cpp as usize;

    let mut entries = Vec::with_capacity(header.ncolors as usize);
    for _ in 0..header.ncolors {
        let line = strings.expect_string("end of color table")?;
        entries.push(parse_color_entry(&line, cpp, resolver)?);
    }
    let has_alpha = entries.iter().any(|e| e.transparent);
    let lookup = CodeLookup::build(&entries, cpp);

    let channels = if has_alpha { 4 } else { 3 };
    let stride = header.width as usize * channels;
    let row_len = header.width as usize * cpp;
    let mut data: Vec<u8> = Vec::new();

    for y in 0..header.height {
        let line = strings.expect_string("end of pixel data")?;
        let codes = line.as_bytes();
        if codes.len() < row_len {
            log::debug!("xpm: row {y} has {} characters, need {row_len}", codes.len());
            return Err(PixbufError::Parse(format!(
                "row {y} has {} characters, expected {row_len}",
                codes.len()
            )));
        }
        if codes.len() > row_len {
            log::warn!("xpm: ignoring {} trailing characters on row {y}", codes.len() - row_len);
        }

        data.try_reserve(stride)
            .map_err(|_| PixbufError::Allocation(data.len() + stride))?;
        let start = data.len();
        data.resize(start + stride, 0);
        let dest = &mut data[start..];
        for (px, code) in dest.chunks_exact_mut(channels).zip(codes.chunks_exact(cpp)) {
            let idx = lookup.find(code).ok_or_else(|| {
                PixbufError::Parse(format!(
                    "row {y}: pixel code {:?} not in color table",
                    String::from_utf8_lossy(code)
                ))
            })?;
            let entry = &entries[idx];
            if entry.transparent {
                px.fill(0);
            } else {
                px[0] = entry.color.r;
                px[1] = entry.color.g;
                px[2] = entry.color.b;
                if has_alpha {
                    px[3] = 0xff;
                }
            }
        }
    }

    PixelBuffer::from_vec(data, header.width, header.height, has_alpha)
}

/// Reads all of `reader` and decodes it as XPM.
pub fn decode_xpm_reader<R: Read>(mut reader: R) -> Result<PixelBuffer> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    decode_xpm(&input)
}

/// Opens and decodes an XPM file.
pub fn decode_xpm_file<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    log::debug!("xpm: loading {}", path.display());
    let file = std::fs::File::open(path)?;
    decode_xpm_reader(std::io::BufReader::new(file))
}
