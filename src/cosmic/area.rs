/*
    Erebus, eclipse operations scheduling for LEO instrument payloads
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use serde_derive::Deserialize;
use std::fmt;

/// A latitude/longitude box, typically one of the high latitude regions where
/// aurora observations are worthwhile. Bounds are decimal degrees.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct Rect {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl Rect {
    /// A degenerate box matches nothing.
    pub fn is_zero(&self) -> bool {
        (self.north - self.south).abs() < f64::EPSILON
            || (self.west - self.east).abs() < f64::EPSILON
    }

    fn is_valid(&self) -> bool {
        self.south < self.north && self.west < self.east
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        if self.is_zero() || !self.is_valid() {
            return false;
        }
        lat <= self.north && lat >= self.south && lng <= self.east && lng >= self.west
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.0}N {:.0}S {:.0}W {:.0}E",
            self.north, self.south, self.west, self.east
        )
    }
}

/// A geographic membership test. The set of shapes is closed, hence a sum type
/// rather than trait objects: a single box, or the union of several shapes.
#[derive(Clone, Debug)]
pub enum Shape {
    Rect(Rect),
    Union(Vec<Shape>),
}

impl Shape {
    /// Builds the union of the provided boxes.
    pub fn from_boxes<I: IntoIterator<Item = Rect>>(boxes: I) -> Self {
        Self::Union(boxes.into_iter().map(Self::Rect).collect())
    }

    /// An area with no valid shape matches nothing.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Rect(r) => r.is_zero(),
            Self::Union(shapes) => shapes.iter().all(Self::is_zero),
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        match self {
            Self::Rect(r) => r.contains(lat, lng),
            Self::Union(shapes) => shapes.iter().any(|s| s.contains(lat, lng)),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Union(Vec::new())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rect(r) => write!(f, "{}", r),
            Self::Union(shapes) => {
                for (i, s) in shapes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "({})", s)?;
                }
                Ok(())
            }
        }
    }
}
