use std::io::Write;

use csv::QuoteStyle;
use serde::Serialize;

/// Writes records as tab-separated rows: no header row, no index column,
/// minimal quoting.
pub struct TsvExporter<I: Iterator> {
    record_iter: I,
}

impl<T, I: Iterator<Item = T>> TsvExporter<I>
where
    T: Serialize,
{
    pub fn new(record_iter: I) -> TsvExporter<I> {
        TsvExporter { record_iter }
    }

    pub fn write_all<W: Write>(&mut self, writer: W) -> std::io::Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Necessary)
            .from_writer(writer);
        for record in &mut self.record_iter {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
