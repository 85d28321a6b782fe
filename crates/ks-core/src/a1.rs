//! A1 notation helpers.

/// Column letters for a 0-based column index: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Range covering a `rows` × `cols` block anchored at `A1`.
///
/// An empty block still addresses the single cell `A1`.
pub fn range_for(rows: usize, cols: usize) -> String {
    let rows = rows.max(1);
    let cols = cols.max(1);
    format!("A1:{}{}", column_letter(cols - 1), rows)
}

/// Parse a cell reference such as `B12` into 0-based `(column, row)`.
pub fn parse_cell(cell: &str) -> Option<(usize, usize)> {
    let cell = cell.trim();
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut column = 0usize;
    for c in letters.chars() {
        let v = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        column = column.checked_mul(26)?.checked_add(v)?;
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((column - 1, row - 1))
}

/// Parse `A1` or `A1:C3` into 0-based top-left and bottom-right corners.
pub fn parse_range(range: &str) -> Option<((usize, usize), (usize, usize))> {
    match range.split_once(':') {
        Some((start, end)) => {
            let start = parse_cell(start)?;
            let end = parse_cell(end)?;
            if end.0 < start.0 || end.1 < start.1 {
                return None;
            }
            Some((start, end))
        }
        None => {
            let cell = parse_cell(range)?;
            Some((cell, cell))
        }
    }
}

pub fn is_valid_range(range: &str) -> bool {
    parse_range(range).is_some()
}

#[cfg(test)]
#[path = "a1_test.rs"]
mod tests;
