//! Character grid produced by a conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn gray(v: u8) -> Self {
        Rgb([v, v, v])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub glyph: char,
    pub color: Option<Rgb>,
}

impl Cell {
    pub fn new(glyph: char) -> Self {
        Self { glyph, color: None }
    }

    /// Same cell with a different glyph; the color annotation is kept.
    pub fn with_glyph(self, glyph: char) -> Self {
        Self { glyph, ..self }
    }
}

/// Rectangular grid of cells, `height` rows of exactly `width` cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CharacterGrid {
    /// Build a grid from rows. Returns `None` if the rows are empty or ragged.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let cells = rows.into_iter().flatten().collect();
        Some(Self { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width)
    }

    /// Build a grid of the same shape by mapping every cell with its position.
    pub fn map_cells(&self, mut f: impl FnMut(usize, usize, Cell) -> Cell) -> Self {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| f(i % self.width, i / self.width, cell))
            .collect();
        Self { width: self.width, height: self.height, cells }
    }

    pub fn has_color(&self) -> bool {
        self.cells.iter().any(|c| c.color.is_some())
    }

    /// Rows joined by `\n`, no trailing newline.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.glyph));
        }
        out
    }

    /// Text with an optional `/* annotation */` line and a blank line in front.
    pub fn to_text_with_annotation(&self, annotation: Option<&str>) -> String {
        match annotation.map(str::trim).filter(|a| !a.is_empty()) {
            Some(note) => format!("/* {note} */\n\n{}", self.to_text()),
            None => self.to_text(),
        }
    }

    /// Text with 24-bit ANSI foreground colors for cells that carry one.
    pub fn to_ansi(&self) -> String {
        if !self.has_color() {
            return self.to_text();
        }
        let mut out = String::new();
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for cell in row {
                match cell.color {
                    Some(Rgb([r, g, b])) => {
                        out.push_str(&format!("\x1b[38;2;{r};{g};{b}m{}", cell.glyph))
                    }
                    None => out.push(cell.glyph),
                }
            }
            out.push_str("\x1b[0m");
        }
        out
    }
}

impl fmt::Display for CharacterGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> CharacterGrid {
        CharacterGrid::from_rows(
            rows.iter().map(|r| r.chars().map(Cell::new).collect()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![Cell::new('a'); 2], vec![Cell::new('b'); 3]];
        assert!(CharacterGrid::from_rows(rows).is_none());
        assert!(CharacterGrid::from_rows(vec![]).is_none());
        assert!(CharacterGrid::from_rows(vec![vec![]]).is_none());
    }

    #[test]
    fn text_joins_rows_without_trailing_newline() {
        let g = grid(&["ab", "cd"]);
        assert_eq!(g.to_text(), "ab\ncd");
        assert_eq!(g.to_string(), "ab\ncd");
        assert_eq!(g.get(1, 1).map(|c| c.glyph), Some('d'));
        assert!(g.get(2, 0).is_none());
    }

    #[test]
    fn annotation_is_prepended_as_comment() {
        let g = grid(&["x"]);
        assert_eq!(g.to_text_with_annotation(Some("cat")), "/* cat */\n\nx");
        assert_eq!(g.to_text_with_annotation(Some("  ")), "x");
        assert_eq!(g.to_text_with_annotation(None), "x");
    }

    #[test]
    fn ansi_output_only_when_colored() {
        let plain = grid(&["ab"]);
        assert_eq!(plain.to_ansi(), "ab");

        let colored = CharacterGrid::from_rows(vec![vec![Cell {
            glyph: '#',
            color: Some(Rgb([1, 2, 3])),
        }]])
        .unwrap();
        assert_eq!(colored.to_ansi(), "\x1b[38;2;1;2;3m#\x1b[0m");
    }
}
