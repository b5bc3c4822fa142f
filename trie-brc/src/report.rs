use std::io::{self, Write};

use crate::index::NameIndex;

/// Writes `{name=min/mean/max, ...}` in byte order of the names, one entry at
/// a time. No trailing newline.
pub fn write_report<W: Write>(index: &NameIndex, out: &mut W) -> io::Result<()> {
    out.write_all(b"{")?;
    for (i, (name, agg)) in index.traverse_sorted().enumerate() {
        if i > 0 {
            out.write_all(b", ")?;
        }
        out.write_all(&name)?;
        write!(out, "={agg}")?;
    }
    out.write_all(b"}")
}

/// Report as a string. Names that are not valid UTF-8 are rendered lossily.
pub fn render_report(index: &NameIndex) -> String {
    let mut buf = Vec::new();
    write_report(index, &mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}
