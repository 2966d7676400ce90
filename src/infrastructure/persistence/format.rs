//! `.gidx` binary store format.
//!
//! ```text
//! Offset  Size  Type      Description
//! ───────────────────────────────────────────────
//! 0x00    8     [u8; 8]   Magic: "GALIDX\0\0"
//! 0x08    2     u16 LE    Format version
//! 0x0A    1     u8        Metric id (1 cosine, 2 euclidean, 3 dot)
//! 0x0B    1     u8        Reserved, 0
//! 0x0C    4     u32 LE    D: dimension
//! 0x10    8     i64 LE    Saved-at, unix millis
//! 0x18    8     u64 LE    N: record count
//! 0x20    ...             N records:
//!                           u32 id length, id (UTF-8)
//!                           u32 vector length (== D), D × f32 LE
//!                           u32 payload length, payload (JSON)
//! ```
//!
//! Exactly N records are followed by end of file.

use crate::domain::entities::record::{Payload, Record};
use crate::domain::error::DomainError;
use crate::domain::index::Snapshot;
use crate::domain::values::metric::Metric;
use chrono::{DateTime, TimeZone, Utc};
use std::io::{self, Read, Write};

pub const MAGIC: [u8; 8] = *b"GALIDX\0\0";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_SIZE: usize = 32;

const MAX_DIMENSION: u32 = 1 << 20;
const MAX_ID_LEN: u32 = 64 * 1024;
const MAX_PAYLOAD_LEN: u32 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreHeader {
    pub version: u16,
    pub metric: Metric,
    pub dimension: u32,
    pub saved_at_ms: i64,
    pub count: u64,
}

impl StoreHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..10].copy_from_slice(&self.version.to_le_bytes());
        buf[10] = self.metric.id();
        buf[12..16].copy_from_slice(&self.dimension.to_le_bytes());
        buf[16..24].copy_from_slice(&self.saved_at_ms.to_le_bytes());
        buf[24..32].copy_from_slice(&self.count.to_le_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Result<Self, DomainError> {
        if bytes[0..8] != MAGIC {
            return Err(DomainError::CorruptStore("invalid magic bytes".into()));
        }
        let version = u16::from_le_bytes([bytes[8], bytes[9]]);
        if version != FORMAT_VERSION {
            return Err(DomainError::CorruptStore(format!(
                "unsupported format version {version}"
            )));
        }
        let metric = Metric::from_id(bytes[10]).ok_or_else(|| {
            DomainError::CorruptStore(format!("unknown metric id {}", bytes[10]))
        })?;
        let dimension = u32::from_le_bytes(le_array(&bytes[12..16]));
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(DomainError::CorruptStore(format!(
                "implausible dimension {dimension}"
            )));
        }
        Ok(Self {
            version,
            metric,
            dimension,
            saved_at_ms: i64::from_le_bytes(le_array(&bytes[16..24])),
            count: u64::from_le_bytes(le_array(&bytes[24..32])),
        })
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.saved_at_ms)
            .single()
            .unwrap_or_default()
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

pub fn write_index<W: Write + ?Sized>(
    writer: &mut W,
    snapshot: &Snapshot,
    saved_at: DateTime<Utc>,
) -> Result<StoreHeader, DomainError> {
    let dimension = u32::try_from(snapshot.dimension())
        .map_err(|_| DomainError::InvalidInput("dimension exceeds u32".into()))?;
    let header = StoreHeader {
        version: FORMAT_VERSION,
        metric: snapshot.metric(),
        dimension,
        saved_at_ms: saved_at.timestamp_millis(),
        count: snapshot.len() as u64,
    };
    writer.write_all(&header.to_bytes())?;

    for record in snapshot.records() {
        write_bytes(writer, record.id.as_bytes())?;
        writer.write_all(&(record.vector.len() as u32).to_le_bytes())?;
        for value in &record.vector {
            writer.write_all(&value.to_le_bytes())?;
        }
        let payload = serde_json::to_vec(&record.payload)
            .map_err(|e| DomainError::InvalidInput(format!("payload of {}: {e}", record.id)))?;
        write_bytes(writer, &payload)?;
    }
    Ok(header)
}

fn write_bytes<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<(), DomainError> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| DomainError::InvalidInput("field longer than u32::MAX bytes".into()))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<StoreHeader, DomainError> {
    let mut buf = [0u8; HEADER_SIZE];
    read_exact(reader, &mut buf, "header")?;
    StoreHeader::from_bytes(&buf)
}

pub fn read_index<R: Read + ?Sized>(
    reader: &mut R,
) -> Result<(StoreHeader, Vec<Record>), DomainError> {
    let header = read_header(reader)?;
    let dimension = header.dimension as usize;

    let mut records = Vec::with_capacity(header.count.min(1 << 16) as usize);
    for n in 0..header.count {
        let id_bytes = read_sized(reader, MAX_ID_LEN, "record id")?;
        let id = String::from_utf8(id_bytes)
            .map_err(|_| DomainError::CorruptStore(format!("record {n}: id is not UTF-8")))?;

        let vector_len = read_u32(reader, "vector length")? as usize;
        if vector_len != dimension {
            return Err(DomainError::CorruptStore(format!(
                "record {id}: vector length {vector_len} disagrees with dimension {dimension}"
            )));
        }
        let mut raw = vec![0u8; dimension * 4];
        read_exact(reader, &mut raw, "vector")?;
        let vector: Vec<f32> = raw
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let payload_bytes = read_sized(reader, MAX_PAYLOAD_LEN, "payload")?;
        let payload: Payload = serde_json::from_slice(&payload_bytes)
            .map_err(|e| DomainError::CorruptStore(format!("record {id}: bad payload: {e}")))?;

        records.push(Record::new(id, vector, payload));
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(DomainError::CorruptStore(format!(
            "trailing data after {} records",
            header.count
        )));
    }
    Ok((header, records))
}

fn read_u32<R: Read + ?Sized>(reader: &mut R, what: &str) -> Result<u32, DomainError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_sized<R: Read + ?Sized>(
    reader: &mut R,
    max: u32,
    what: &str,
) -> Result<Vec<u8>, DomainError> {
    let len = read_u32(reader, what)?;
    if len > max {
        return Err(DomainError::CorruptStore(format!(
            "{what} length {len} exceeds limit {max}"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    read_exact(reader, &mut buf, what)?;
    Ok(buf)
}

fn read_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<(), DomainError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => DomainError::CorruptStore(format!("truncated {what}")),
        _ => DomainError::StorageIo(e),
    })
}
