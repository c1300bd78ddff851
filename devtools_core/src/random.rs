//! Thin wrappers over the OS random source shared by the generators.
use crate::error::{Result, ToolError};

pub fn fill(buf: &mut [u8]) -> Result<()> {
    getrandom::fill(buf).map_err(|err| ToolError::Random(err.to_string()))
}

pub fn bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill(&mut buf)?;
    Ok(buf)
}

/// Uniform integer in `0..bound` using rejection sampling.
pub fn below(bound: u64) -> Result<u64> {
    if bound == 0 {
        return Err(ToolError::OutOfRange("random bound must be positive".into()));
    }
    let zone = u64::MAX - (u64::MAX % bound);
    loop {
        let value = u64::from_le_bytes(bytes::<8>()?);
        if value < zone {
            return Ok(value % bound);
        }
    }
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T]) -> Result<()> {
    for idx in (1..items.len()).rev() {
        let swap = below(idx as u64 + 1)? as usize;
        items.swap(idx, swap);
    }
    Ok(())
}
