//! XMLTV rendering for looping channels.

use std::collections::HashSet;
use std::io;

use camino::Utf8Path;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{GUIDE_WINDOW_HOURS, OutputOwner, Settings};
use crate::domain::{CacheRecord, Category};
use crate::error::EpgError;
use crate::fs_util;
use crate::store::CacheStore;

const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S +0000";

/// Parameters of one guide document.
#[derive(Debug, Clone)]
pub struct GuideOptions {
    pub category: Category,
    pub slot_duration_hours: u32,
    pub window_start: DateTime<Utc>,
    pub source_info_name: String,
    pub owner: Option<OutputOwner>,
    pub mode: Option<u32>,
}

impl GuideOptions {
    pub fn new(category: Category, settings: &Settings, now: DateTime<Utc>) -> Self {
        Self {
            category,
            slot_duration_hours: settings.slot_duration_hours,
            window_start: start_of_day(now),
            source_info_name: settings.source_info_name.clone(),
            owner: settings.output_owner,
            mode: settings.output_mode,
        }
    }

    pub fn slot_count(&self) -> u32 {
        GUIDE_WINDOW_HOURS / self.slot_duration_hours.max(1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuideReport {
    pub path: String,
    pub channels: usize,
    pub programmes: usize,
    pub skipped: Vec<String>,
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn format_xmltv_time(time: DateTime<Utc>) -> String {
    time.format(XMLTV_TIME_FORMAT).to_string()
}

/// Look up each listed title and write the guide to `output`.
///
/// Titles without a cached record are skipped; they simply have no channel.
pub fn emit(
    store: &CacheStore,
    output: &Utf8Path,
    titles: &[String],
    options: &GuideOptions,
) -> Result<GuideReport, EpgError> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for name in titles {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match store.get(name, options.category)? {
            Some(record) => records.push(record),
            None => {
                debug!(name, "no cached record, skipping channel");
                skipped.push(name.clone());
            }
        }
    }

    let document = render(&records, options)?;
    fs_util::write_atomic(output, &document)?;
    info!("EPG file generated: {output}");
    fs_util::adjust_permissions(output, options.owner, options.mode);

    Ok(GuideReport {
        path: output.to_string(),
        channels: records.len(),
        programmes: records.len() * options.slot_count() as usize,
        skipped,
    })
}

/// Render records into a complete XMLTV document.
pub fn render(records: &[CacheRecord], options: &GuideOptions) -> Result<Vec<u8>, EpgError> {
    write_document(records, options).map_err(|err| EpgError::Xml(err.to_string()))
}

fn write_document(records: &[CacheRecord], options: &GuideOptions) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("tv");
    root.push_attribute(("source-info-name", options.source_info_name.as_str()));
    writer.write_event(Event::Start(root))?;

    for record in records {
        write_channel(&mut writer, record)?;
    }
    for record in records {
        write_programmes(&mut writer, record, options)?;
    }

    writer.write_event(Event::End(BytesEnd::new("tv")))?;
    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}

fn write_channel(writer: &mut Writer<Vec<u8>>, record: &CacheRecord) -> io::Result<()> {
    let channel_id = record.channel_id();
    writer
        .create_element("channel")
        .with_attribute(("id", channel_id.as_str()))
        .write_inner_content(|writer| {
            writer
                .create_element("display-name")
                .write_text_content(BytesText::new(&record.title))?;
            if let Some(icon) = record.icon() {
                writer
                    .create_element("icon")
                    .with_attribute(("src", icon))
                    .write_empty()?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_programmes(
    writer: &mut Writer<Vec<u8>>,
    record: &CacheRecord,
    options: &GuideOptions,
) -> io::Result<()> {
    let channel_id = record.channel_id();
    let slot = Duration::hours(i64::from(options.slot_duration_hours));
    for index in 0..options.slot_count() {
        let start = options.window_start + slot * index as i32;
        let stop = start + slot;
        let start = format_xmltv_time(start);
        let stop = format_xmltv_time(stop);
        writer
            .create_element("programme")
            .with_attribute(("start", start.as_str()))
            .with_attribute(("stop", stop.as_str()))
            .with_attribute(("channel", channel_id.as_str()))
            .write_inner_content(|writer| {
                writer
                    .create_element("title")
                    .with_attribute(("lang", "en"))
                    .write_text_content(BytesText::new(&record.title))?;
                writer
                    .create_element("desc")
                    .with_attribute(("lang", "en"))
                    .write_text_content(BytesText::new(&record.description))?;
                writer
                    .create_element("category")
                    .with_attribute(("lang", "en"))
                    .write_text_content(BytesText::new(options.category.guide_label()))?;
                if let Some(icon) = record.icon() {
                    writer
                        .create_element("icon")
                        .with_attribute(("src", icon))
                        .write_empty()?;
                }
                Ok(())
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn start_of_day_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 42, 5).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn xmltv_time_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap();
        assert_eq!(format_xmltv_time(time), "20240310050000 +0000");
    }

    #[test]
    fn slot_count_floors() {
        let options = GuideOptions {
            category: Category::Series,
            slot_duration_hours: 5,
            window_start: Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap(),
            source_info_name: "test".to_string(),
            owner: None,
            mode: None,
        };
        assert_eq!(options.slot_count(), 9);
    }
}
