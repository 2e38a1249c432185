//! CSV export, identical to the page's download for the initial view

use crate::error::Result;
use crate::report::Site;
use crate::table::csv::CsvExport;
use std::io::Write;

pub fn write<W: Write>(writer: &mut W, site: &Site) -> Result<()> {
    let export = CsvExport::from_view(&site.records, &site.table_state())?;
    writer.write_all(&export.body)?;
    Ok(())
}
