//! Time-series mosaic folders: one granule per flight, named by date, plus
//! the two property files the map server reads to index them.

use super::imaging::temp_sibling;
use crate::collaborators::CoverageUpdate;
use chrono::NaiveDate;
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// Product prefix of every granule file.
pub const GRANULE_PRODUCT: &str = "ortho";
pub const INDEXER_PROPERTIES: &str = "TimeAttribute=ingestion\n\
Schema=*the_geom:Polygon,location:String,ingestion:java.util.Date\n\
PropertyCollectors=TimestampFileNameExtractorSPI[timeregex](ingestion)";
pub const TIMEREGEX_PROPERTIES: &str = "regex=[0-9]{8},format=yyyyMMdd";

/// `<product>_<YYYYMMDD>.tif`; the map server extracts the date from this name.
pub fn granule_name(product: &str, date: NaiveDate) -> String {
    format!("{product}_{}.tif", date.format("%Y%m%d"))
}

/// First date shared by two flights; those would be staged under one granule name.
pub fn duplicate_date(dates: impl IntoIterator<Item = NaiveDate>) -> Option<NaiveDate> {
    dates.into_iter().duplicates().next()
}

/// Replaces `path` with `contents` through a temporary sibling.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = temp_sibling(path);
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

/// Copies `source` into `folder` as the granule of `date`.
pub async fn stage_granule(source: &Path, folder: &Path, date: NaiveDate) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(folder).await?;
    let target = folder.join(granule_name(GRANULE_PRODUCT, date));
    let tmp = temp_sibling(&target);
    tokio::fs::copy(source, &tmp).await?;
    tokio::fs::rename(&tmp, &target).await?;
    Ok(target)
}

pub async fn write_properties(folder: &Path) -> std::io::Result<()> {
    write_atomically(&folder.join("indexer.properties"), INDEXER_PROPERTIES.as_bytes()).await?;
    write_atomically(&folder.join("timeregex.properties"), TIMEREGEX_PROPERTIES.as_bytes()).await
}

/// Coverage settings of a mosaic: list-presented time dimension, black as
/// transparent output color.
pub fn time_series_update() -> CoverageUpdate {
    CoverageUpdate::enabled()
        .with_time_dimension()
        .with_parameter("OutputTransparentColor", "#000000")
}
