use std::path::Path;

use log::{debug, info};

use crate::device::DeviceTransport;
use crate::error::{DeviceFlagsError, Result};
use crate::flag::{ParsedFlagRecord, Partition};
use crate::index::SnapshotIndex;
use crate::parse_flags::parse_flags;

/// Pulls every partition's flag document into a scratch directory and builds
/// the snapshot index.
///
/// Any pull or parse failure aborts the whole load. The scratch directory is
/// removed on every path out of this function.
pub fn fetch_snapshot<T>(transport: &T, scratch_root: Option<&Path>) -> Result<SnapshotIndex>
where
    T: DeviceTransport + ?Sized,
{
    let mut builder = tempfile::Builder::new();
    builder.prefix("aconfig-");
    let scratch = match scratch_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
    .map_err(|e| DeviceFlagsError::io("failed to create scratch directory", e))?;

    let mut partitions = Vec::with_capacity(Partition::ALL.len());
    for partition in Partition::ALL {
        let records = fetch_partition(transport, partition, scratch.path())?;
        partitions.push((partition, records));
    }
    let index = SnapshotIndex::from_partitions(partitions);
    info!("loaded {} aconfig flags from device", index.len());
    Ok(index)
}

/// Pulls and parses a single partition's document into `dir`.
pub fn fetch_partition<T>(
    transport: &T,
    partition: Partition,
    dir: &Path,
) -> Result<Vec<ParsedFlagRecord>>
where
    T: DeviceTransport + ?Sized,
{
    let device_path = partition.device_path();
    let host_path = dir.join(partition.local_file_name());
    debug!("pulling {} to {}", device_path, host_path.display());
    transport.pull(&device_path, &host_path)?;

    let bytes = std::fs::read(&host_path)
        .map_err(|e| DeviceFlagsError::io(format!("failed to read {}", host_path.display()), e))?;
    let content = String::from_utf8(bytes)
        .map_err(|_| DeviceFlagsError::parse(&device_path, "document is not valid UTF-8"))?;
    let records = parse_flags(&content).map_err(|e| DeviceFlagsError::parse(&device_path, e))?;
    debug!("{}: {} flags", partition, records.len());
    Ok(records)
}
