use crate::model::{ClockTime, ShopConfig, SpecialEntry};
use crate::render;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::path::Path;

/// Import de dérogations depuis CSV: header `date,closed[,open][,close][,note]`
pub fn import_special_dates_csv<P: AsRef<Path>>(
    path: P,
) -> anyhow::Result<BTreeMap<NaiveDate, SpecialEntry>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = BTreeMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date_raw = rec.get(0).context("missing date")?.trim();
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date_raw}"))?;
        let closed = match rec.get(1).map(str::trim) {
            Some(flag) if !flag.is_empty() => parse_bool(flag)
                .with_context(|| format!("invalid closed value for date {date_raw}"))?,
            _ => false,
        };
        let note = rec
            .get(4)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let entry = if closed {
            match note {
                Some(n) => SpecialEntry::closed_with_note(n),
                None => SpecialEntry::closed(),
            }
        } else {
            let open: ClockTime = rec
                .get(2)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .context("missing open time")?
                .parse()
                .with_context(|| format!("invalid open time for date {date_raw}"))?;
            let close: ClockTime = rec
                .get(3)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .context("missing close time")?
                .parse()
                .with_context(|| format!("invalid close time for date {date_raw}"))?;
            SpecialEntry::hours(open, close, note)
        };
        out.insert(date, entry);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Export CSV des dérogations: header `date,closed,open,close,note`
pub fn export_special_dates_csv<P: AsRef<Path>>(
    path: P,
    dates: &BTreeMap<NaiveDate, SpecialEntry>,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "closed", "open", "close", "note"])?;
    for (date, entry) in dates {
        let date_s = date.to_string();
        match entry {
            SpecialEntry::Closed { note, .. } => {
                w.write_record([
                    date_s.as_str(),
                    "true",
                    "",
                    "",
                    note.as_deref().unwrap_or(""),
                ])?;
            }
            SpecialEntry::Hours { open, close, note } => {
                let open_s = open.to_string();
                let close_s = close.to_string();
                w.write_record([
                    date_s.as_str(),
                    "false",
                    open_s.as_str(),
                    close_s.as_str(),
                    note.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

/// Export CSV de la semaine type: header `weekday,name,closed,open,close,label,note`
pub fn export_week_csv<P: AsRef<Path>>(path: P, config: &ShopConfig) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["weekday", "name", "closed", "open", "close", "label", "note"])?;
    let fallback = ShopConfig::fallback_hours();
    for day in 0..7u8 {
        let name = render::day_name(day).unwrap_or("");
        let hours = config.business_hours.get(&day);
        let closed = config.closed_weekdays.contains(&day)
            || hours.map(|h| h.closed).unwrap_or(false);
        let open = hours.map(|h| h.open).unwrap_or(fallback.open).to_string();
        let close = hours.map(|h| h.close).unwrap_or(fallback.close).to_string();
        let day_s = day.to_string();
        w.write_record([
            day_s.as_str(),
            name,
            if closed { "true" } else { "false" },
            open.as_str(),
            close.as_str(),
            hours.and_then(|h| h.label.as_deref()).unwrap_or(""),
            hours.and_then(|h| h.note.as_deref()).unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}
