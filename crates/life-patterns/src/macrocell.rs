//! Macrocell (`.mc`) pattern format.
//!
//! The file opens with an `[M2]` header line; `#R`/`#G` comments carry the
//! rule and generation count. Each subsequent line appends one quadtree
//! node to an arena: leaf lines encode an 8x8 block over `.` (dead), `*`
//! (alive), and `$` (row end, trailing dead cells suppressed); non-leaf
//! lines are five integers `log2size nw ne sw se` whose child references
//! point at earlier arena slots. Slot 0 is the reserved empty sentinel and
//! the last node is the root.

use crate::PatternError;

const LEAF_SIZE: usize = 8;

/// Branch nodes sit above the 8x8 leaves, so their log2 size starts at 4;
/// the cap keeps `1 << log2_size` well inside `usize` on any target.
const LOG2_SIZE_MIN: u32 = 4;
const LOG2_SIZE_MAX: u32 = 60;

/// Quadtree node stored in the parse arena, addressed by index.
#[derive(Debug, Clone)]
enum McNode {
    /// Sentinel filling slot 0: a fully dead quadrant of any size.
    Empty,
    Leaf([[bool; LEAF_SIZE]; LEAF_SIZE]),
    Branch { size: usize, children: [usize; 4] },
}

/// A decoded Macrocell pattern.
#[derive(Debug, Clone)]
pub struct McPattern {
    /// Side length of the (square) universe described by the root node.
    pub size: usize,
    pub cells: Vec<(i64, i64)>,
    pub rule: Option<String>,
    pub generation: Option<u64>,
}

pub fn parse(text: &str) -> Result<McPattern, PatternError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(PatternError::EmptyFile)?;
    if !header.starts_with("[M2]") {
        return Err(PatternError::MissingHeader);
    }

    let mut rule = None;
    let mut generation = None;
    let mut nodes: Vec<McNode> = vec![McNode::Empty];

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#R") {
            rule = Some(rest.trim().to_owned());
            continue;
        }
        if let Some(rest) = line.strip_prefix("#G") {
            generation = rest.trim().parse::<u64>().ok();
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let node = if line.starts_with(['.', '*', '$']) {
            McNode::Leaf(parse_leaf(line)?)
        } else {
            parse_branch(line, nodes.len())?
        };
        nodes.push(node);
    }

    if nodes.len() < 2 {
        return Err(PatternError::EmptyFile);
    }

    let root = nodes.len() - 1;
    let size = node_size(&nodes, root);
    let mut cells = Vec::new();
    collect_live(&nodes, root, 0, 0, &mut cells);
    cells.sort_unstable_by_key(|&(x, y)| (y, x));

    Ok(McPattern {
        size,
        cells,
        rule,
        generation,
    })
}

fn parse_leaf(line: &str) -> Result<[[bool; LEAF_SIZE]; LEAF_SIZE], PatternError> {
    let mut grid = [[false; LEAF_SIZE]; LEAF_SIZE];
    let mut row = 0;
    let mut col = 0;
    for ch in line.chars() {
        match ch {
            '$' => {
                row += 1;
                col = 0;
                if row >= LEAF_SIZE {
                    break;
                }
            }
            '*' | '.' => {
                if row < LEAF_SIZE && col < LEAF_SIZE {
                    grid[row][col] = ch == '*';
                }
                col += 1;
            }
            other => return Err(PatternError::InvalidLeafToken { token: other }),
        }
    }
    Ok(grid)
}

fn parse_branch(line: &str, arena_len: usize) -> Result<McNode, PatternError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(PatternError::InvalidNode {
            line: line.to_owned(),
        });
    }
    let log2_size: u32 = fields[0].parse().map_err(|_| PatternError::InvalidNode {
        line: line.to_owned(),
    })?;
    if !(LOG2_SIZE_MIN..=LOG2_SIZE_MAX).contains(&log2_size) {
        return Err(PatternError::InvalidNode {
            line: line.to_owned(),
        });
    }
    let mut children = [0usize; 4];
    for (slot, field) in children.iter_mut().zip(&fields[1..]) {
        let reference: usize = field.parse().map_err(|_| PatternError::InvalidNode {
            line: line.to_owned(),
        })?;
        // References must point at already-parsed arena slots.
        if reference >= arena_len {
            return Err(PatternError::NodeReferenceOutOfRange {
                reference,
                line: line.to_owned(),
            });
        }
        *slot = reference;
    }
    Ok(McNode::Branch {
        size: 1usize << log2_size,
        children,
    })
}

fn node_size(nodes: &[McNode], index: usize) -> usize {
    match &nodes[index] {
        McNode::Empty => 0,
        McNode::Leaf(_) => LEAF_SIZE,
        McNode::Branch { size, .. } => *size,
    }
}

fn collect_live(nodes: &[McNode], index: usize, x: i64, y: i64, out: &mut Vec<(i64, i64)>) {
    match &nodes[index] {
        McNode::Empty => {}
        McNode::Leaf(grid) => {
            for (dy, row) in grid.iter().enumerate() {
                for (dx, alive) in row.iter().enumerate() {
                    if *alive {
                        out.push((x + dx as i64, y + dy as i64));
                    }
                }
            }
        }
        McNode::Branch { size, children } => {
            let half = (*size / 2) as i64;
            // Child order: NW, NE, SW, SE.
            collect_live(nodes, children[0], x, y, out);
            collect_live(nodes, children[1], x + half, y, out);
            collect_live(nodes, children[2], x, y + half, out);
            collect_live(nodes, children[3], x + half, y + half, out);
        }
    }
}
