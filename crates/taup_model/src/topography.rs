//! Topography grid (C10 input): a 20-arc-second regular elevation grid,
//! memory-mapped rather than read wholesale since the file is large.
//!
//! Layout: a leading 4-byte record length, a fixed-width header (three
//! `i32` counts, one `f32` ratio, six `f32` bounds for longitude/latitude
//! min/step/max), then one record per latitude row of `num_longitudes`
//! big-endian... no — little-endian 16-bit elevations in meters. Every
//! record (header and rows) is framed front and back by an identical
//! 4-byte length, wrapped at ±180° longitude with one halo cell, latitude
//! indexed from the north pole to the south pole.

use crate::error::ModelError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use taup_tables::{IndexMap, UniformIndex};

#[derive(Debug, Clone, Copy)]
struct TopoHeader {
    num_longitudes: usize,
    num_latitudes: usize,
    /// Width, in grid columns, of the wraparound halo at ±180° longitude.
    halo_columns: usize,
    header_record_len: usize,
    lon_min: f64,
    lon_step: f64,
    lat_min: f64,
    lat_step: f64,
    rows_offset: usize,
}

/// A memory-mapped topography grid, read-only once opened.
pub struct TopographyGrid {
    mmap: Mmap,
    header: TopoHeader,
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32, ModelError> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .ok_or_else(|| ModelError::MalformedFile("truncated topography header".into()))?
        .try_into()
        .unwrap();
    Ok(i32::from_le_bytes(bytes))
}

fn read_f32(data: &[u8], offset: usize) -> Result<f32, ModelError> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .ok_or_else(|| ModelError::MalformedFile("truncated topography header".into()))?
        .try_into()
        .unwrap();
    Ok(f32::from_le_bytes(bytes))
}

impl TopographyGrid {
    // SAFETY: the file is opened read-only and not mutated for the lifetime
    // of this mapping; concurrent external truncation is the caller's
    // responsibility, as for any mmap-backed reader. This is the one
    // sanctioned unsafe block in this crate, carved out of the workspace's
    // `forbid(unsafe_code)` lint.
    #[allow(unsafe_code)]
    pub fn open(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let header = Self::parse_header(&mmap)?;
        Ok(Self { mmap, header })
    }

    fn parse_header(data: &[u8]) -> Result<TopoHeader, ModelError> {
        let leading_len = read_i32(data, 0)? as usize;
        let header_start = 4usize;
        let header_end = header_start + leading_len;
        if header_end + 4 > data.len() {
            return Err(ModelError::MalformedFile(
                "topography header record runs past end of file".into(),
            ));
        }
        let trailing_len = read_i32(data, header_end)? as usize;
        if trailing_len != leading_len {
            return Err(ModelError::MalformedFile(
                "topography header framing mismatch".into(),
            ));
        }

        let num_longitudes = read_i32(data, header_start)? as usize;
        let num_latitudes = read_i32(data, header_start + 4)? as usize;
        let halo_columns = read_i32(data, header_start + 8)? as usize;
        let _ratio = read_f32(data, header_start + 12)?;
        let lon_min = read_f32(data, header_start + 16)? as f64;
        let lon_step = read_f32(data, header_start + 20)? as f64;
        let _lon_max = read_f32(data, header_start + 24)? as f64;
        let lat_min = read_f32(data, header_start + 28)? as f64;
        let lat_step = read_f32(data, header_start + 32)? as f64;
        let _lat_max = read_f32(data, header_start + 36)? as f64;

        Ok(TopoHeader {
            num_longitudes,
            num_latitudes,
            halo_columns,
            header_record_len: leading_len,
            lon_min,
            lon_step,
            lat_min,
            lat_step,
            rows_offset: header_end + 4,
        })
    }

    /// Elevation in km at the bilinearly-interpolated grid cell nearest
    /// `(lat_deg, lon_deg)`.
    pub fn elevation_km(&self, lat_deg: f64, lon_deg: f64) -> Result<f64, ModelError> {
        let row_data = self.read_row_pair(lat_deg)?;
        let lon_index = UniformIndex::new(self.header.lon_min, self.header.lon_step, self.header.num_longitudes);
        let frac = lon_index.index_of(lon_deg);
        let c0 = (frac.floor() as isize).clamp(0, self.header.num_longitudes as isize - 2).max(0) as usize;
        let fc = frac - c0 as f64;

        let (row_lo, row_hi, flat) = row_data;
        let v00 = row_lo[c0] as f64;
        let v01 = row_lo[c0 + 1] as f64;
        let v10 = row_hi[c0] as f64;
        let v11 = row_hi[c0 + 1] as f64;

        let top = v00 + (v01 - v00) * fc;
        let bottom = v10 + (v11 - v10) * fc;
        let meters = top + (bottom - top) * flat;
        Ok(meters / 1000.0)
    }

    fn read_row_pair(&self, lat_deg: f64) -> Result<(Vec<i16>, Vec<i16>, f64), ModelError> {
        let lat_index = UniformIndex::new(self.header.lat_min, self.header.lat_step, self.header.num_latitudes);
        let frac = lat_index.index_of(lat_deg);
        let r0 = (frac.floor() as isize).clamp(0, self.header.num_latitudes as isize - 2).max(0) as usize;
        let flat = frac - r0 as f64;
        let row_lo = self.read_row(r0)?;
        let row_hi = self.read_row(r0 + 1)?;
        Ok((row_lo, row_hi, flat))
    }

    fn read_row(&self, row: usize) -> Result<Vec<i16>, ModelError> {
        let expected_bytes = self.header.num_longitudes * 2;
        // Every row record is framed the same way as the header.
        let mut offset = self.header.rows_offset;
        for _ in 0..row {
            let len = read_i32(&self.mmap, offset)? as usize;
            offset += 4 + len + 4;
        }
        let leading_len = read_i32(&self.mmap, offset)? as usize;
        if leading_len != expected_bytes {
            return Err(ModelError::MalformedFile(format!(
                "topography row {row} length {leading_len} != expected {expected_bytes}"
            )));
        }
        let payload_start = offset + 4;
        let payload_end = payload_start + leading_len;
        let trailing_len = read_i32(&self.mmap, payload_end)? as usize;
        if trailing_len != leading_len {
            return Err(ModelError::MalformedFile(format!(
                "topography row {row} framing mismatch"
            )));
        }
        let mut values = Vec::with_capacity(self.header.num_longitudes);
        let mut p = payload_start;
        while p < payload_end {
            let bytes: [u8; 2] = self.mmap[p..p + 2].try_into().unwrap();
            values.push(i16::from_le_bytes(bytes));
            p += 2;
        }
        Ok(values)
    }

    pub fn header_record_len(&self) -> usize {
        self.header.header_record_len
    }

    pub fn halo_columns(&self) -> usize {
        self.header.halo_columns
    }
}
