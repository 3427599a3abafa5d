//! Matroska-style chapter XML parsing.
//!
//! Only the fields needed for skipping are read: start, end, and the first
//! display string of each `ChapterAtom`. Nested atoms are flattened.

use serde::Deserialize;
use tracing::debug;

use crate::domain::Provenance;

use super::source::RawSegment;

#[derive(Debug, Default, Deserialize)]
struct Chapters {
    #[serde(rename = "EditionEntry", default)]
    editions: Vec<EditionEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct EditionEntry {
    #[serde(rename = "ChapterAtom", default)]
    atoms: Vec<ChapterAtom>,
}

#[derive(Debug, Default, Deserialize)]
struct ChapterAtom {
    #[serde(rename = "ChapterTimeStart")]
    start: Option<String>,

    #[serde(rename = "ChapterTimeEnd")]
    end: Option<String>,

    #[serde(rename = "ChapterDisplay", default)]
    displays: Vec<ChapterDisplay>,

    #[serde(rename = "ChapterAtom", default)]
    children: Vec<ChapterAtom>,
}

#[derive(Debug, Default, Deserialize)]
struct ChapterDisplay {
    #[serde(rename = "ChapterString")]
    string: Option<String>,
}

/// Convert `HH:MM:SS(.fraction)` to seconds
pub fn hms_to_seconds(hms: &str) -> Result<f64, String> {
    let parts: Vec<&str> = hms.trim().split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        return Err(format!("expected HH:MM:SS, got '{}'", hms));
    };

    let hours: u64 = h.parse().map_err(|e| format!("bad hours in '{}': {}", hms, e))?;
    let minutes: u64 = m.parse().map_err(|e| format!("bad minutes in '{}': {}", hms, e))?;
    let seconds: f64 = s.parse().map_err(|e| format!("bad seconds in '{}': {}", hms, e))?;

    Ok((hours * 3600 + minutes * 60) as f64 + seconds)
}

/// Parse chapter XML into raw segments. Atoms without both times are skipped.
pub fn parse_chapters(xml: &str) -> Result<Vec<RawSegment>, String> {
    let chapters: Chapters = quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;

    let mut segments = Vec::new();
    for edition in &chapters.editions {
        for atom in &edition.atoms {
            collect_atom(atom, &mut segments)?;
        }
    }

    Ok(segments)
}

fn collect_atom(atom: &ChapterAtom, out: &mut Vec<RawSegment>) -> Result<(), String> {
    if let (Some(start), Some(end)) = (&atom.start, &atom.end) {
        let label = atom
            .displays
            .iter()
            .find_map(|d| d.string.clone())
            .unwrap_or_default();

        let segment = RawSegment {
            start: hms_to_seconds(start)?,
            end: hms_to_seconds(end)?,
            label,
            action_code: None,
            provenance: Provenance::Xml,
        };
        debug!(start = segment.start, end = segment.end, label = %segment.label, "Parsed chapter");
        out.push(segment);
    }

    for child in &atom.children {
        collect_atom(child, out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<Chapters>
  <EditionEntry>
    <EditionFlagDefault>1</EditionFlagDefault>
    <ChapterAtom>
      <ChapterUID>1</ChapterUID>
      <ChapterTimeStart>00:00:00.000</ChapterTimeStart>
      <ChapterTimeEnd>00:01:30.000</ChapterTimeEnd>
      <ChapterDisplay>
        <ChapterString>Intro</ChapterString>
        <ChapterLanguage>eng</ChapterLanguage>
      </ChapterDisplay>
      <ChapterAtom>
        <ChapterTimeStart>00:00:20.000</ChapterTimeStart>
        <ChapterTimeEnd>00:00:40.000</ChapterTimeEnd>
        <ChapterDisplay>
          <ChapterString>Recap</ChapterString>
        </ChapterDisplay>
      </ChapterAtom>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:42:10.500</ChapterTimeStart>
      <ChapterTimeEnd>00:44:00.000</ChapterTimeEnd>
      <ChapterDisplay>
        <ChapterString>Credits</ChapterString>
      </ChapterDisplay>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:50:00.000</ChapterTimeStart>
    </ChapterAtom>
  </EditionEntry>
</Chapters>
"#;

    #[test]
    fn test_hms_to_seconds() {
        assert_eq!(hms_to_seconds("00:01:30.000").unwrap(), 90.0);
        assert_eq!(hms_to_seconds("01:00:00.5").unwrap(), 3600.5);
        assert!(hms_to_seconds("90").is_err());
        assert!(hms_to_seconds("aa:00:00").is_err());
    }

    #[test]
    fn test_parse_sample() {
        let segments = parse_chapters(SAMPLE).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].label, "Intro");
        assert_eq!(segments[0].end, 90.0);
        assert_eq!(segments[1].label, "Recap");
        assert_eq!(segments[1].start, 20.0);
        assert_eq!(segments[2].start, 2530.5);
        assert!(segments.iter().all(|s| s.provenance == Provenance::Xml));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_chapters("<Chapters><EditionEntry>").is_err());
    }
}
