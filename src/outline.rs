//! Outline parsing: raw indented text into ordered groups of leveled items.
//!
//! Any text is valid input. Groups are separated by runs of two or more
//! blank lines; a single blank line is ignored so loosely spaced outlines
//! stay together. Levels are derived from an indent stack, so irregular
//! indentation widths still produce a monotonic nesting relationship.

/// Spaces a tab counts for when measuring indentation.
pub const TAB_UNITS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    pub level: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub items: Vec<Item>,
}

/// Parse a whole document. Empty or all-blank input yields no groups.
pub fn parse_outline(text: &str) -> Vec<Group> {
    split_blocks(text)
        .into_iter()
        .map(|lines| parse_block(&lines))
        .filter(|group| !group.items.is_empty())
        .collect()
}

/// Split into blocks of raw lines on blank-line runs of length >= 2.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.trim().is_empty() {
            blank_run += 1;
            if blank_run >= 2 && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            blank_run = 0;
            current.push(raw);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Indentation of a line in space units (tab = [`TAB_UNITS`]).
fn indent_units(line: &str) -> usize {
    let mut units = 0;
    for ch in line.chars() {
        match ch {
            ' ' => units += 1,
            '\t' => units += TAB_UNITS,
            _ => break,
        }
    }
    units
}

/// Assign levels within one block using an indent stack. The first item
/// anchors level 0; deeper indentation pushes a level, equal indentation
/// keeps it, shallower indentation pops back to the nearest remaining
/// ancestor (or opens a level below it when no recorded indent matches).
fn parse_block(lines: &[&str]) -> Group {
    let mut items = Vec::new();
    let mut indent_stack: Vec<usize> = Vec::new();
    let mut level_stack: Vec<usize> = Vec::new();

    for raw in lines {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_units(raw);
        if items.is_empty() {
            indent_stack = vec![indent];
            level_stack = vec![0];
            items.push(Item {
                text: trimmed.to_string(),
                level: 0,
            });
            continue;
        }

        let mut top_indent = *indent_stack.last().unwrap_or(&0);
        let top_level = *level_stack.last().unwrap_or(&0);
        let level = if indent > top_indent {
            indent_stack.push(indent);
            level_stack.push(top_level + 1);
            top_level + 1
        } else if indent == top_indent {
            top_level
        } else {
            while indent_stack.len() > 1 && *indent_stack.last().unwrap_or(&0) > indent {
                indent_stack.pop();
                level_stack.pop();
            }
            top_indent = *indent_stack.last().unwrap_or(&0);
            let resumed = *level_stack.last().unwrap_or(&0);
            if indent > top_indent {
                indent_stack.push(indent);
                level_stack.push(resumed + 1);
                resumed + 1
            } else {
                resumed
            }
        };
        items.push(Item {
            text: trimmed.to_string(),
            level,
        });
    }

    Group { items }
}
