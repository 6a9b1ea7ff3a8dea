//! Plaintext pattern format: `O` marks a live cell, a newline advances the
//! row, and every other character is a dead cell.

/// Extract live-cell coordinates from plaintext pattern text. Total: any
/// input yields a (possibly empty) coordinate list.
pub fn parse(text: &str) -> Vec<(i64, i64)> {
    let mut cells = Vec::new();
    for (y, line) in text.lines().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch == 'O' {
                cells.push((x as i64, y as i64));
            }
        }
    }
    cells
}
