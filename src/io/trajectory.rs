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

extern crate csv;

use crate::errors::ErebusError;
use crate::time::Epoch;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::io::Read;

const TIME_INDEX: usize = 0;
const LAT_INDEX: usize = 3;
const LON_INDEX: usize = 4;
const ECLIPSE_INDEX: usize = 5;
const SAA_INDEX: usize = 6;
const COLUMNS: usize = 8;

/// The tri-valued crossing flag of a trajectory sample. Any value outside the
/// enter/leave sets keeps the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    Enter,
    Leave,
    Hold,
}

impl Crossing {
    fn parse(value: &str) -> Self {
        match value {
            "1" | "true" | "on" => Self::Enter,
            "0" | "false" | "off" => Self::Leave,
            _ => Self::Hold,
        }
    }

    pub fn enters(self) -> bool {
        self == Self::Enter
    }

    pub fn leaves(self) -> bool {
        self == Self::Leave
    }
}

/// A single row of the predicted trajectory. Only the timestamp, the ground
/// track coordinates and the two crossing flags are read, but all eight
/// columns must be present.
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub when: Epoch,
    pub lat: f64,
    pub lng: f64,
    pub eclipse: Crossing,
    pub saa: Crossing,
}

/// Streams trajectory samples out of a CSV reader. Lines starting with `#`
/// are comments and the first record is a header; both are skipped.
pub struct SampleReader<R: Read> {
    records: StringRecordsIntoIter<R>,
    row: usize,
}

impl<R: Read> SampleReader<R> {
    pub fn new(rdr: R) -> Self {
        let records = ReaderBuilder::new()
            .comment(Some(b'#'))
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr)
            .into_records();
        Self { records, row: 0 }
    }

    fn parse(&self, record: &StringRecord) -> Result<Sample, ErebusError> {
        if record.len() != COLUMNS {
            return Err(ErebusError::ShapeBadSyntax {
                row: self.row,
                expected: COLUMNS,
                found: record.len(),
            });
        }
        let stamp = &record[TIME_INDEX];
        let when = Epoch::from_gregorian_str(stamp).map_err(|_| ErebusError::TimeBadSyntax {
            row: self.row,
            value: stamp.to_owned(),
        })?;
        let lat = self.parse_angle(&record[LAT_INDEX])?;
        let lng = self.parse_angle(&record[LON_INDEX])?;
        Ok(Sample {
            when,
            lat,
            lng,
            eclipse: Crossing::parse(&record[ECLIPSE_INDEX]),
            saa: Crossing::parse(&record[SAA_INDEX]),
        })
    }

    fn parse_angle(&self, value: &str) -> Result<f64, ErebusError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| ErebusError::NumberBadSyntax {
                row: self.row,
                value: value.to_owned(),
            })
    }
}

impl<R: Read> Iterator for SampleReader<R> {
    type Item = Result<Sample, ErebusError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(ErebusError::BadUsage(e.to_string()))),
        };
        self.row += 1;
        Some(self.parse(&record))
    }
}
