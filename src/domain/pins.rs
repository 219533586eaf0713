//! Switch pin state matrix.
//!
//! The controller reports its pins either as a space-separated list of
//! integers (`PINSTAT ALL`) or, through the websocket daemon, as a JSON
//! object `{"rows": .., "cols": .., "pins": [..]}`.

use crate::domain::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ROWS: u16 = 16;
pub const DEFAULT_COLS: u16 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinGrid {
    rows: u16,
    cols: u16,
    pins: Vec<bool>,
}

impl PinGrid {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            pins: vec![false; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn total(&self) -> usize {
        self.pins.len()
    }

    pub fn get(&self, index: usize) -> ProbeResult<bool> {
        self.pins
            .get(index)
            .copied()
            .ok_or_else(|| out_of_range(format!("pin index {}", index)))
    }

    pub fn get_at(&self, row: u16, col: u16) -> ProbeResult<bool> {
        let index = self.index_of(row, col)?;
        Ok(self.pins[index])
    }

    pub fn set(&mut self, index: usize, value: bool) -> ProbeResult<()> {
        let pin = self
            .pins
            .get_mut(index)
            .ok_or_else(|| out_of_range(format!("pin index {}", index)))?;
        *pin = value;
        Ok(())
    }

    pub fn set_at(&mut self, row: u16, col: u16, value: bool) -> ProbeResult<()> {
        let index = self.index_of(row, col)?;
        self.pins[index] = value;
        Ok(())
    }

    /// Number of pins currently on.
    pub fn count_on(&self) -> usize {
        self.pins.iter().filter(|pin| **pin).count()
    }

    pub fn to_json(&self) -> ProbeResult<String> {
        serde_json::to_string(self).map_err(|e| ProbeError::Output(e.to_string()))
    }

    /// Parse a daemon state frame. The pin list must cover the whole grid.
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        let grid: PinGrid = serde_json::from_str(json)
            .map_err(|e| ProbeError::InvalidData(format!("not a pin grid: {}", e)))?;
        let expected = grid.rows as usize * grid.cols as usize;
        if grid.pins.len() != expected {
            return Err(ProbeError::InvalidData(format!(
                "pin grid {}x{} carries {} pins, expected {}",
                grid.rows,
                grid.cols,
                grid.pins.len(),
                expected
            )));
        }
        Ok(grid)
    }

    /// Parse a `PINSTAT ALL` reply into a `rows x cols` grid.
    pub fn from_pinstat(response: &str, rows: u16, cols: u16) -> ProbeResult<Self> {
        let mut grid = Self::new(rows, cols);
        let mut values = response.split_whitespace();

        for index in 0..grid.total() {
            let token = values.next().ok_or_else(|| {
                ProbeError::InvalidData(format!(
                    "PINSTAT reply ended after {} of {} pins",
                    index,
                    grid.total()
                ))
            })?;
            let state: i64 = token.parse().map_err(|_| {
                ProbeError::InvalidData(format!("PINSTAT value {:?} is not an integer", token))
            })?;
            grid.pins[index] = state != 0;
        }

        if values.next().is_some() {
            return Err(ProbeError::InvalidData(format!(
                "PINSTAT reply carries more than {} pins",
                grid.total()
            )));
        }

        Ok(grid)
    }

    /// One line of `0`/`1` per row.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.total() + self.rows as usize);
        for row in self.pins.chunks(self.cols.max(1) as usize) {
            out.extend(row.iter().map(|pin| if *pin { '1' } else { '0' }));
            out.push('\n');
        }
        out
    }

    fn index_of(&self, row: u16, col: u16) -> ProbeResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(out_of_range(format!("pin ({}, {})", row, col)));
        }
        Ok(row as usize * self.cols as usize + col as usize)
    }
}

impl Default for PinGrid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl fmt::Display for PinGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn out_of_range(what: String) -> ProbeError {
    ProbeError::InvalidInput(format!("{} is outside the pin grid", what))
}
