//! The "ask for the count, then fill" enumeration pattern.
use crate::ProbeError;
use ash::vk;
use log::trace;
use std::{
    ffi::CStr,
    os::raw::c_char,
};

/// Run a two-call Vulkan enumeration.
///
/// `query` is called once with `None` to learn the record count. A count of
/// zero returns an empty `Vec` without allocating or calling `query` again.
/// Otherwise exactly `count` records are reserved and `query` is called a
/// second time with the buffer. The count written back by the second call is
/// authoritative: the result is truncated to it, never grown.
///
/// Any filter (a layer name, for instance) must be captured by `query` so
/// both calls observe the same result set.
///
/// `buffer` names the records in the allocation failure message.
pub fn enumerate_two_call<T, F>(buffer: &'static str, mut query: F) -> Result<Vec<T>, ProbeError>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    let mut count = 0;
    check(buffer, query(&mut count, None))?;
    trace!("{buffer}: sizing call reported {count} records");

    if count == 0 {
        return Ok(Vec::new());
    }

    let len = count as usize;
    let mut records = reserve_records(buffer, len)?;
    records.resize(len, T::default());

    check(buffer, query(&mut count, Some(&mut records)))?;
    records.truncate(count as usize);

    Ok(records)
}

/// An empty `Vec` with room for exactly `len` records, or the allocation
/// failure naming `buffer`.
fn reserve_records<T>(buffer: &'static str, len: usize) -> Result<Vec<T>, ProbeError> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(len)
        .map_err(|_| ProbeError::Allocation { buffer, count: len })?;
    Ok(records)
}

fn check(query: &'static str, result: vk::Result) -> Result<(), ProbeError> {
    match result {
        vk::Result::SUCCESS | vk::Result::INCOMPLETE => Ok(()),
        result => Err(ProbeError::Query { query, result }),
    }
}

/// The bytes of a fixed-size, NUL-padded C string, up to the first NUL or
/// the end of the array.
pub fn fixed_bytes(raw: &[c_char]) -> &[u8] {
    // SAFETY: c_char and u8 have the same size and alignment.
    let bytes = unsafe { std::slice::from_raw_parts(raw.as_ptr().cast::<u8>(), raw.len()) };
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// A fixed-size C string as a `CStr`, or `None` if the array holds no NUL.
pub fn fixed_cstr(raw: &[c_char]) -> Option<&CStr> {
    // SAFETY: c_char and u8 have the same size and alignment.
    let bytes = unsafe { std::slice::from_raw_parts(raw.as_ptr().cast::<u8>(), raw.len()) };
    CStr::from_bytes_until_nul(bytes).ok()
}
