//! Static Helvetica width table used to word-wrap PDF text.
//!
//! printpdf places text but never wraps it, so line breaks are computed here.
//! Widths are the standard Helvetica AFM advances in em units.
//! The table covers ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Helvetica-Bold runs slightly wider than the regular face.
const BOLD_SCALE: f32 = 1.07;

/// Fallback width for anything outside the table.
const AVERAGE_CHAR_WIDTH: f32 = 0.556;

/// `HELVETICA_WIDTHS[i]` = width of ASCII character `(i + 32)`.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

fn char_width(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_CHAR_WIDTH
    }
}

/// Width of `s` in em units of regular Helvetica.
pub fn measure_str(s: &str) -> f32 {
    s.chars().map(char_width).sum()
}

/// Width of `s` in millimetres at the given size.
pub fn measure_mm(s: &str, font_size_pt: f32, bold: bool) -> f32 {
    let scale = if bold { BOLD_SCALE } else { 1.0 };
    measure_str(s) * font_size_pt * scale / PT_PER_MM
}

/// Greedy word wrap of a single line to `max_width_mm`.
///
/// Words wider than the line are split by character. A blank input yields no lines.
pub fn wrap_line(text: &str, font_size_pt: f32, bold: bool, max_width_mm: f32) -> Vec<String> {
    let fits = |s: &str| measure_mm(s, font_size_pt, bold) <= max_width_mm;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }

        // Oversized word (URLs, long tokens): hard break.
        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
