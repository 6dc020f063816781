use crate::pdf::PagedDocument;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = PagedDocument::load_mem(&bytes)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
    let info = doc.info();

    println!("File:       {}", path.display());
    println!("Version:    PDF {}", info.version);
    println!("Pages:      {}", info.page_count);

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{:<11} {}", format!("{}:", label), value);
        }
    }
    if let Some(created) = &info.creation_date {
        println!("{:<11} {}", "Created:", format_pdf_date(created));
    }

    Ok(())
}

/// Render a PDF date (`D:YYYYMMDDHHmmSS...`) as `YYYY-MM-DD HH:mm:SS`.
fn format_pdf_date(date: &str) -> String {
    let Some(digits) = date.strip_prefix("D:") else {
        return date.to_string();
    };
    let part = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
    };

    match (part(0..4), part(4..6), part(6..8)) {
        (Some(year), Some(month), Some(day)) => {
            let time = match (part(8..10), part(10..12), part(12..14)) {
                (Some(h), Some(m), Some(s)) => format!(" {}:{}:{}", h, m, s),
                _ => String::new(),
            };
            format!("{}-{}-{}{}", year, month, day, time)
        }
        _ => date.to_string(),
    }
}
