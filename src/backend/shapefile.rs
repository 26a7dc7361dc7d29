// Header readers for the shapefile trio. Only headers are read; geometry and
// attribute records are left alone.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use crate::backend::FieldDef;

const SHP_FILE_CODE: u32 = 9994;
const SHP_HEADER_LEN: usize = 100;
const DBF_HEADER_LEN: usize = 32;
const DBF_FIELD_LEN: usize = 32;
const DBF_TERMINATOR: u8 = 0x0D;

pub const SIDECARS: [&str; 5] = ["shx", "dbf", "prj", "cpg", "qix"];

/// Bounding box from the `.shp` header as (min x, max x, min y, max y).
pub fn read_extent(shp: &Path) -> Result<(f64, f64, f64, f64)> {
    let bytes = fs::read(shp).with_context(|| format!("Failed to read {}", shp.display()))?;
    if bytes.len() < SHP_HEADER_LEN {
        bail!("{} is too short to be a shapefile", shp.display());
    }
    let code = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if code != SHP_FILE_CODE {
        bail!("{} is not a shapefile (file code {})", shp.display(), code);
    }
    let f = |at: usize| {
        let mut b = [0u8; 8];
        b.copy_from_slice(&bytes[at..at + 8]);
        f64::from_le_bytes(b)
    };
    let (min_x, min_y, max_x, max_y) = (f(36), f(44), f(52), f(60));
    Ok((min_x, max_x, min_y, max_y))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbfHeader {
    pub record_count: u32,
    pub fields: Vec<FieldDef>,
}

pub fn read_dbf_header(dbf: &Path) -> Result<DbfHeader> {
    let bytes = fs::read(dbf).with_context(|| format!("Failed to read {}", dbf.display()))?;
    if bytes.len() < DBF_HEADER_LEN {
        bail!("{} is too short to be a dBase file", dbf.display());
    }
    let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

    let mut fields = Vec::new();
    let mut at = DBF_HEADER_LEN;
    while at + DBF_FIELD_LEN <= bytes.len() && bytes[at] != DBF_TERMINATOR {
        let desc = &bytes[at..at + DBF_FIELD_LEN];
        let name_end = desc[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&desc[..name_end]).trim().to_string();
        let width = desc[16] as u32;
        let precision = desc[17] as u32;
        fields.push(FieldDef {
            name,
            type_name: field_type_name(desc[11], precision).to_string(),
            width,
            precision,
        });
        at += DBF_FIELD_LEN;
    }

    Ok(DbfHeader { record_count, fields })
}

fn field_type_name(code: u8, precision: u32) -> &'static str {
    match code {
        b'C' => "String",
        b'N' if precision > 0 => "Real",
        b'N' => "Integer",
        b'F' => "Real",
        b'L' => "Integer",
        b'D' => "Date",
        _ => "Unknown",
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    /// Writes a header-only `.shp` and a `.dbf` with the given fields and record count.
    pub fn write_shapefile(dir: &Path, stem: &str, records: u32, fields: &[(&str, u8, u8, u8)]) {
        let mut shp = vec![0u8; 100];
        shp[0..4].copy_from_slice(&9994u32.to_be_bytes());
        for (i, v) in [-10.0f64, 20.0, 30.0, 40.0].iter().enumerate() {
            shp[36 + i * 8..44 + i * 8].copy_from_slice(&v.to_le_bytes());
        }
        fs::write(dir.join(format!("{}.shp", stem)), shp).unwrap();

        let mut dbf = vec![0u8; 32];
        dbf[0] = 3;
        dbf[4..8].copy_from_slice(&records.to_le_bytes());
        for (name, kind, width, precision) in fields {
            let mut desc = [0u8; 32];
            desc[..name.len()].copy_from_slice(name.as_bytes());
            desc[11] = *kind;
            desc[16] = *width;
            desc[17] = *precision;
            dbf.extend_from_slice(&desc);
        }
        dbf.push(0x0D);
        fs::write(dir.join(format!("{}.dbf", stem)), dbf).unwrap();
        fs::write(dir.join(format!("{}.shx", stem)), b"index").unwrap();
    }
}
