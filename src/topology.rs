//! Logical addressing of the tree.
//!
//! The 24 body LEDs sit on 8 branches of 3, wired branch by branch from the
//! trunk outwards. A grid position is `(row, column)` where the row is the
//! height layer (0 nearest the trunk) and the column is the branch. The star
//! on top is its own LED, reachable as [`Position::Star`] or as row
//! [`STAR_ROW`] of the grid.

use crate::error::{Result, TreeError};

pub const GRID_ROWS: usize = 3;
pub const GRID_COLUMNS: usize = 8;
/// Pseudo-row that addresses the star
pub const STAR_ROW: usize = GRID_ROWS;
pub const STAR_INDEX: usize = GRID_ROWS * GRID_COLUMNS;
/// LEDs on a complete tree: the grid plus the star
pub const TREE_LEDS: usize = STAR_INDEX + 1;

/// Flat index of a body LED
pub fn grid_index(row: usize, column: usize) -> usize {
    column * GRID_ROWS + row
}

/// Half-open range with a positive step. Missing bounds default to the
/// start and end of whatever axis the span is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub step: usize,
}

impl Span {
    /// The whole axis
    pub fn all() -> Self {
        Span {
            start: None,
            stop: None,
            step: 1,
        }
    }

    pub fn new(start: usize, stop: usize) -> Self {
        Span {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }

    pub fn step_by(self, step: usize) -> Self {
        Span { step, ..self }
    }

    /// Indices of the span over an axis of `axis_len`. Stops after the
    /// first index at or past `limit`, which the caller reports as out of
    /// range.
    fn expand(&self, axis_len: usize, limit: usize) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(TreeError::ZeroStep);
        }
        let start = self.start.unwrap_or(0);
        let stop = self.stop.unwrap_or(axis_len);
        let mut indices = Vec::new();
        for index in (start..stop).step_by(self.step) {
            indices.push(index);
            if index >= limit {
                break;
            }
        }
        Ok(indices)
    }
}

/// One axis of a grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    One(usize),
    Span(Span),
}

impl Selector {
    fn expand(&self, axis_len: usize, limit: usize) -> Result<Vec<usize>> {
        match self {
            Selector::One(i) => Ok(vec![*i]),
            Selector::Span(span) => span.expand(axis_len, limit),
        }
    }
}

/// Where a write or read lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Flat LED index
    Single(usize),
    /// Flat index range
    Range(Span),
    /// `(row, column)` region; a row span without a stop covers the body only
    Grid(Selector, Selector),
    Star,
}

impl Position {
    pub fn cell(row: usize, column: usize) -> Self {
        Position::Grid(Selector::One(row), Selector::One(column))
    }

    /// Every column of one height layer
    pub fn layer(row: usize) -> Self {
        Position::Grid(Selector::One(row), Selector::Span(Span::all()))
    }

    /// Every body row of one branch
    pub fn column(column: usize) -> Self {
        Position::Grid(Selector::Span(Span::all()), Selector::One(column))
    }

    pub fn all() -> Self {
        Position::Range(Span::all())
    }

    /// True when the position names exactly one LED by construction
    pub fn is_single(&self) -> bool {
        matches!(
            self,
            Position::Single(_)
                | Position::Star
                | Position::Grid(Selector::One(_), Selector::One(_))
        )
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position::Single(index)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, column): (usize, usize)) -> Self {
        Position::cell(row, column)
    }
}

/// Expand a position into flat indices, in write order.
///
/// Flat indices are not checked against `nled` here; the caller checks each
/// one as it is written. Grid rows and columns are checked up front.
pub fn resolve(position: &Position, nled: usize) -> Result<Vec<usize>> {
    match position {
        Position::Single(index) => Ok(vec![*index]),
        Position::Range(span) => span.expand(nled, nled),
        Position::Star => Ok(vec![STAR_INDEX]),
        Position::Grid(rows, columns) => {
            let rows = rows.expand(GRID_ROWS, STAR_ROW + 1)?;
            let columns = columns.expand(GRID_COLUMNS, GRID_COLUMNS)?;
            for &column in &columns {
                if column >= GRID_COLUMNS {
                    return Err(TreeError::IndexOutOfRange {
                        index: column,
                        limit: GRID_COLUMNS,
                    });
                }
            }

            let mut indices = Vec::with_capacity(rows.len() * columns.len());
            for &row in &rows {
                if row == STAR_ROW {
                    // The star row has a single LED whatever the columns
                    if !columns.is_empty() {
                        indices.push(STAR_INDEX);
                    }
                    continue;
                }
                if row > STAR_ROW {
                    return Err(TreeError::IndexOutOfRange {
                        index: row,
                        limit: STAR_ROW + 1,
                    });
                }
                indices.extend(columns.iter().map(|&column| grid_index(row, column)));
            }
            Ok(indices)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_grid_is_bijection() {
        let mut seen = HashSet::new();
        for row in 0..GRID_ROWS {
            for column in 0..GRID_COLUMNS {
                let index = grid_index(row, column);
                assert!(index < STAR_INDEX);
                assert!(seen.insert(index), "collision at ({}, {})", row, column);
            }
        }
        assert_eq!(seen.len(), 24);
        assert!(!seen.contains(&STAR_INDEX));
    }

    #[test]
    fn test_star_alias() {
        assert_eq!(resolve(&Position::Star, 25).unwrap(), vec![24]);
        assert_eq!(resolve(&Position::cell(STAR_ROW, 5), 25).unwrap(), vec![24]);
        assert_eq!(resolve(&Position::layer(STAR_ROW), 25).unwrap(), vec![24]);
    }

    #[test]
    fn test_layer_and_column() {
        assert_eq!(
            resolve(&Position::layer(0), 25).unwrap(),
            vec![0, 3, 6, 9, 12, 15, 18, 21]
        );
        assert_eq!(resolve(&Position::column(2), 25).unwrap(), vec![6, 7, 8]);
    }

    #[test]
    fn test_full_row_span_excludes_star() {
        let all = Position::Grid(Selector::Span(Span::all()), Selector::Span(Span::all()));
        let indices = resolve(&all, 25).unwrap();
        assert_eq!(indices.len(), 24);
        assert!(!indices.contains(&STAR_INDEX));

        let with_star = Position::Grid(Selector::Span(Span::new(0, 4)), Selector::One(0));
        assert_eq!(resolve(&with_star, 25).unwrap(), vec![0, 1, 2, 24]);
    }

    #[test]
    fn test_flat_range_defaults() {
        assert_eq!(resolve(&Position::all(), 25).unwrap(), (0..25).collect::<Vec<_>>());
        let evens = Position::Range(Span::all().step_by(2));
        assert_eq!(resolve(&evens, 25).unwrap().len(), 13);
        let tail = Position::Range(Span {
            start: Some(20),
            stop: None,
            step: 1,
        });
        assert_eq!(resolve(&tail, 25).unwrap(), vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_flat_range_is_not_clamped() {
        let past_end = Position::Range(Span::new(23, 27));
        assert_eq!(resolve(&past_end, 25).unwrap(), vec![23, 24, 25, 26]);
    }

    #[test]
    fn test_huge_flat_range_stops_at_first_bad_index() {
        let huge = Position::Range(Span::new(0, usize::MAX / 2));
        let indices = resolve(&huge, 25).unwrap();
        assert_eq!(indices.len(), 26);
        assert_eq!(indices.last(), Some(&25));

        let far = Position::Range(Span::new(usize::MAX / 2, usize::MAX));
        assert_eq!(resolve(&far, 25).unwrap(), vec![usize::MAX / 2]);
    }

    #[test]
    fn test_huge_grid_spans() {
        let columns = Position::Grid(Selector::One(0), Selector::Span(Span::new(0, usize::MAX)));
        assert!(matches!(
            resolve(&columns, 25),
            Err(TreeError::IndexOutOfRange { index: 8, limit: 8 })
        ));
        let rows = Position::Grid(Selector::Span(Span::new(0, usize::MAX)), Selector::One(0));
        assert!(matches!(
            resolve(&rows, 25),
            Err(TreeError::IndexOutOfRange { index: 4, limit: 4 })
        ));
    }

    #[test]
    fn test_zero_step() {
        let bad = Position::Range(Span::all().step_by(0));
        assert!(matches!(resolve(&bad, 25), Err(TreeError::ZeroStep)));
    }

    #[test]
    fn test_grid_out_of_range() {
        assert!(matches!(
            resolve(&Position::cell(0, 8), 25),
            Err(TreeError::IndexOutOfRange { index: 8, limit: 8 })
        ));
        assert!(matches!(
            resolve(&Position::cell(4, 0), 25),
            Err(TreeError::IndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Position::from(7), Position::Single(7));
        assert_eq!(Position::from((1, 2)), Position::cell(1, 2));
        assert!(Position::from((1, 2)).is_single());
        assert!(!Position::layer(1).is_single());
    }
}
