//! Run-Length-Encoded pattern format.
//!
//! `#` lines are comments. The first non-comment line is the header
//! `x = W, y = H` (extra fields such as a rule are tolerated and ignored).
//! Pattern data is runs of `b` (dead) and `o` (alive), `$` ends a row (with
//! an optional count), and `!` terminates the pattern.

use crate::PatternError;

/// A decoded RLE pattern: declared bounding box plus live coordinates.
#[derive(Debug, Clone)]
pub struct RlePattern {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<(i64, i64)>,
}

pub fn parse(text: &str) -> Result<RlePattern, PatternError> {
    let mut lines = text.lines().enumerate();

    let (_, header) = lines
        .by_ref()
        .map(|(idx, line)| (idx, line.trim()))
        .find(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .ok_or(PatternError::MissingHeader)?;
    let (width, height) = parse_header(header)?;

    let mut cells = Vec::new();
    let mut x: i64 = 0;
    let mut y: i64 = 0;
    // Run counts may be split from their tag by a line break, so the digit
    // buffer survives across lines.
    let mut digits = String::new();

    for (line_idx, raw) in lines {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        for (col_idx, ch) in raw.chars().enumerate() {
            match ch {
                ch if ch.is_whitespace() => {}
                '0'..='9' => digits.push(ch),
                'b' | 'o' | '$' | '!' => {
                    let count = if digits.is_empty() {
                        1
                    } else {
                        let parsed = digits
                            .parse::<i64>()
                            .map_err(|_| PatternError::InvalidRunLength {
                                digits: digits.clone(),
                            })?;
                        digits.clear();
                        parsed
                    };
                    match ch {
                        'b' => x += count,
                        'o' => {
                            for _ in 0..count {
                                cells.push((x, y));
                                x += 1;
                            }
                        }
                        '$' => {
                            y += count;
                            x = 0;
                        }
                        _ => {
                            return Ok(RlePattern {
                                width,
                                height,
                                cells,
                            });
                        }
                    }
                }
                other => {
                    return Err(PatternError::UnexpectedToken {
                        token: other,
                        line: line_idx + 1,
                        column: col_idx + 1,
                    });
                }
            }
        }
    }

    // Missing '!' terminator; accept what was decoded, as the reference
    // parser does.
    Ok(RlePattern {
        width,
        height,
        cells,
    })
}

fn parse_header(line: &str) -> Result<(usize, usize), PatternError> {
    if !line.starts_with('x') {
        return Err(PatternError::InvalidHeader {
            line: line.to_owned(),
        });
    }
    let mut width = None;
    let mut height = None;
    for field in line.split(',') {
        let mut parts = field.splitn(2, '=');
        let key = parts.next().map(str::trim);
        let value = parts.next().map(str::trim);
        match (key, value) {
            (Some("x"), Some(v)) => width = v.parse::<usize>().ok(),
            (Some("y"), Some(v)) => height = v.parse::<usize>().ok(),
            _ => {}
        }
    }
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(PatternError::InvalidHeader {
            line: line.to_owned(),
        }),
    }
}
