//! Block font used to rasterize text shapes.
//!
//! Every glyph is 7 rows of 5 cells. Text is laid out with one blank column
//! between glyphs.

/// Rows per glyph.
pub const GLYPH_ROWS: usize = 7;

/// Filled columns per glyph.
pub const GLYPH_COLS: usize = 5;

/// Horizontal advance per character, in glyph cells.
pub const GLYPH_ADVANCE: usize = GLYPH_COLS + 1;

type Glyph = [&'static str; GLYPH_ROWS];

/// Capital letters A-Z.
const LETTERS: [Glyph; 26] = [
    // A
    [" ███ ", "█   █", "█   █", "█████", "█   █", "█   █", "█   █"],
    // B
    ["████ ", "█   █", "█   █", "████ ", "█   █", "█   █", "████ "],
    // C
    [" ███ ", "█   █", "█    ", "█    ", "█    ", "█   █", " ███ "],
    // D
    ["████ ", "█   █", "█   █", "█   █", "█   █", "█   █", "████ "],
    // E
    ["█████", "█    ", "█    ", "████ ", "█    ", "█    ", "█████"],
    // F
    ["█████", "█    ", "█    ", "████ ", "█    ", "█    ", "█    "],
    // G
    [" ███ ", "█   █", "█    ", "█ ███", "█   █", "█   █", " ███ "],
    // H
    ["█   █", "█   █", "█   █", "█████", "█   █", "█   █", "█   █"],
    // I
    [" ███ ", "  █  ", "  █  ", "  █  ", "  █  ", "  █  ", " ███ "],
    // J
    ["  ███", "   █ ", "   █ ", "   █ ", "   █ ", "█  █ ", " ██  "],
    // K
    ["█   █", "█  █ ", "█ █  ", "██   ", "█ █  ", "█  █ ", "█   █"],
    // L
    ["█    ", "█    ", "█    ", "█    ", "█    ", "█    ", "█████"],
    // M
    ["█   █", "██ ██", "█ █ █", "█ █ █", "█   █", "█   █", "█   █"],
    // N
    ["█   █", "█   █", "██  █", "█ █ █", "█  ██", "█   █", "█   █"],
    // O
    [" ███ ", "█   █", "█   █", "█   █", "█   █", "█   █", " ███ "],
    // P
    ["████ ", "█   █", "█   █", "████ ", "█    ", "█    ", "█    "],
    // Q
    [" ███ ", "█   █", "█   █", "█   █", "█ █ █", "█  █ ", " ██ █"],
    // R
    ["████ ", "█   █", "█   █", "████ ", "█ █  ", "█  █ ", "█   █"],
    // S
    [" ████", "█    ", "█    ", " ███ ", "    █", "    █", "████ "],
    // T
    ["█████", "  █  ", "  █  ", "  █  ", "  █  ", "  █  ", "  █  "],
    // U
    ["█   █", "█   █", "█   █", "█   █", "█   █", "█   █", " ███ "],
    // V
    ["█   █", "█   █", "█   █", "█   █", "█   █", " █ █ ", "  █  "],
    // W
    ["█   █", "█   █", "█   █", "█ █ █", "█ █ █", "█ █ █", " █ █ "],
    // X
    ["█   █", "█   █", " █ █ ", "  █  ", " █ █ ", "█   █", "█   █"],
    // Y
    ["█   █", "█   █", " █ █ ", "  █  ", "  █  ", "  █  ", "  █  "],
    // Z
    ["█████", "    █", "   █ ", "  █  ", " █   ", "█    ", "█████"],
];

/// Digits 0-9.
const DIGITS: [Glyph; 10] = [
    // 0
    [" ███ ", "█   █", "█  ██", "█ █ █", "██  █", "█   █", " ███ "],
    // 1
    ["  █  ", " ██  ", "  █  ", "  █  ", "  █  ", "  █  ", " ███ "],
    // 2
    [" ███ ", "█   █", "    █", "   █ ", "  █  ", " █   ", "█████"],
    // 3
    ["█████", "   █ ", "  █  ", "   █ ", "    █", "█   █", " ███ "],
    // 4
    ["   █ ", "  ██ ", " █ █ ", "█  █ ", "█████", "   █ ", "   █ "],
    // 5
    ["█████", "█    ", "████ ", "    █", "    █", "█   █", " ███ "],
    // 6
    ["  ██ ", " █   ", "█    ", "████ ", "█   █", "█   █", " ███ "],
    // 7
    ["█████", "    █", "   █ ", "  █  ", " █   ", " █   ", " █   "],
    // 8
    [" ███ ", "█   █", "█   █", " ███ ", "█   █", "█   █", " ███ "],
    // 9
    [" ███ ", "█   █", "█   █", " ████", "    █", "   █ ", " ██  "],
];

const QUESTION: Glyph = [" ███ ", "█   █", "    █", "   █ ", "  █  ", "     ", "  █  "];
const EXCLAMATION: Glyph = ["  █  ", "  █  ", "  █  ", "  █  ", "  █  ", "     ", "  █  "];
const APOSTROPHE: Glyph = ["  █  ", "  █  ", " █   ", "     ", "     ", "     ", "     "];
const PERIOD: Glyph = ["     ", "     ", "     ", "     ", "     ", " ██  ", " ██  "];
const COMMA: Glyph = ["     ", "     ", "     ", "     ", " ██  ", "  █  ", " █   "];
const HYPHEN: Glyph = ["     ", "     ", "     ", "█████", "     ", "     ", "     "];
const COLON: Glyph = ["     ", " ██  ", " ██  ", "     ", " ██  ", " ██  ", "     "];
const AMPERSAND: Glyph = [" ██  ", "█  █ ", "█ █  ", " █   ", "█ █ █", "█  █ ", " ██ █"];

/// Look up the glyph for a character.
///
/// Lowercase letters share the uppercase glyphs. Returns `None` for spaces
/// and characters the font does not cover; those still take up one advance.
pub fn glyph(ch: char) -> Option<&'static Glyph> {
    match ch.to_ascii_uppercase() {
        c @ 'A'..='Z' => Some(&LETTERS[(c as u8 - b'A') as usize]),
        c @ '0'..='9' => Some(&DIGITS[(c as u8 - b'0') as usize]),
        '?' => Some(&QUESTION),
        '!' => Some(&EXCLAMATION),
        '\'' | '’' => Some(&APOSTROPHE),
        '.' => Some(&PERIOD),
        ',' => Some(&COMMA),
        '-' => Some(&HYPHEN),
        ':' => Some(&COLON),
        '&' => Some(&AMPERSAND),
        _ => None,
    }
}

/// Iterate the filled cells of a glyph as `(column, row)` pairs.
pub fn filled_cells(glyph: &Glyph) -> impl Iterator<Item = (usize, usize)> + '_ {
    glyph.iter().enumerate().flat_map(|(row, line)| {
        line.chars()
            .enumerate()
            .filter(|&(_, c)| c == '█')
            .map(move |(col, _)| (col, row))
    })
}

/// Width of `text` in glyph cells, without trailing spacing.
pub fn text_cells(text: &str) -> usize {
    let count = text.chars().count();
    if count == 0 {
        0
    } else {
        count * GLYPH_ADVANCE - 1
    }
}
