// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The pad-zone template and master document.
//!
//! Live's rack format has no schema available to us; fields are addressed by
//! element name, ancestry, and document-order position. Several logical fields
//! are duplicated across independent positions that must always agree, so each
//! logical field is exposed here as one atomic set-all-positions operation.
//! A lookup matching nothing means a shipped template is broken, which is
//! fatal.
//!
//! The templates are immutable embedded assets; every pad gets a fresh parse
//! so no state leaks between pads.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::RackError;

/// The empty drum rack document.
const BLANK_DRUM_RACK: &str = include_str!("../assets/blank_drum_rack.xml");

/// One unpopulated pad zone.
const DRUM_BRANCH_PRESET: &str = include_str!("../assets/drum_branch_preset.xml");

/// The element holding pad zones inside the master document.
const PAD_BRANCH_CONTAINER: &str = "BranchPresets";

/// Which occurrences of a matched field to write.
enum Positions<'a> {
    All,
    First,
    Indices(&'a [usize]),
}

impl Positions<'_> {
    fn includes(&self, index: usize) -> bool {
        match self {
            Positions::All => true,
            Positions::First => index == 0,
            Positions::Indices(indices) => indices.contains(&index),
        }
    }
}

/// A parsed XML fragment held as an owned event stream.
pub struct Fragment {
    events: Vec<Event<'static>>,
}

impl Fragment {
    /// Parses a fresh copy of the pad-zone template.
    pub fn drum_branch() -> Result<Fragment, RackError> {
        Fragment::parse(DRUM_BRANCH_PRESET)
    }

    fn parse(text: &str) -> Result<Fragment, RackError> {
        let mut reader = Reader::from_str(text);
        let mut events = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Eof => break,
                event => events.push(event.into_owned()),
            }
        }
        Ok(Fragment { events })
    }

    /// Sets an attribute on the fragment's root element.
    pub fn set_root_attribute(&mut self, key: &str, value: &str) -> Result<(), RackError> {
        for event in self.events.iter_mut() {
            if let Event::Start(elem) = event {
                *elem = with_attribute(elem, key, value)?;
                return Ok(());
            }
        }
        Err(RackError::TemplateCorruption(format!(
            "root attribute {}",
            key
        )))
    }

    /// Sets the `Value` attribute of every matching occurrence of `field`.
    pub fn set_all(
        &mut self,
        ancestors: &[&str],
        field: &str,
        value: &str,
    ) -> Result<(), RackError> {
        self.set(ancestors, field, value, Positions::All)
    }

    /// Sets the `Value` attribute of the first matching occurrence of `field`.
    pub fn set_first(
        &mut self,
        ancestors: &[&str],
        field: &str,
        value: &str,
    ) -> Result<(), RackError> {
        self.set(ancestors, field, value, Positions::First)
    }

    /// Sets the `Value` attribute of the given document-order occurrences of
    /// `field`. Every requested occurrence must exist.
    pub fn set_occurrences(
        &mut self,
        ancestors: &[&str],
        field: &str,
        occurrences: &[usize],
        value: &str,
    ) -> Result<(), RackError> {
        self.set(ancestors, field, value, Positions::Indices(occurrences))
    }

    /// Walks the event stream tracking the open-element stack and rewrites the
    /// `Value` attribute of each selected occurrence of `field` whose stack
    /// contains `ancestors` in order.
    fn set(
        &mut self,
        ancestors: &[&str],
        field: &str,
        value: &str,
        positions: Positions,
    ) -> Result<(), RackError> {
        let mut stack: Vec<String> = Vec::new();
        let mut occurrence = 0usize;
        let mut written = 0usize;
        let mut expected = match &positions {
            Positions::Indices(indices) => indices.len(),
            _ => 0,
        };

        for event in self.events.iter_mut() {
            match event {
                Event::Start(elem) => {
                    stack.push(local_name(elem));
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Empty(elem) => {
                    if local_name(elem) == field && contains_in_order(&stack, ancestors) {
                        if positions.includes(occurrence) {
                            *elem = with_attribute(elem, "Value", value)?;
                            written += 1;
                        }
                        occurrence += 1;
                    }
                }
                _ => {}
            }
        }

        if expected == 0 {
            expected = 1;
        }
        if written < expected {
            return Err(RackError::TemplateCorruption(format!(
                "{}{}",
                ancestors
                    .iter()
                    .map(|a| format!("{}//", a))
                    .collect::<String>(),
                field
            )));
        }
        Ok(())
    }
}

/// The master preset document: the blank rack plus, in selection order, one
/// populated pad-zone fragment per pad. Append-only.
pub struct RackDocument {
    events: Vec<Event<'static>>,
    /// Index of the pad-branch container's closing tag; fragments are
    /// spliced in just ahead of it.
    insert_at: usize,
}

impl RackDocument {
    /// Parses a fresh master document from the blank rack template.
    pub fn new() -> Result<RackDocument, RackError> {
        let fragment = Fragment::parse(BLANK_DRUM_RACK)?;
        let events = fragment.events;
        let insert_at = events
            .iter()
            .position(|event| match event {
                Event::End(elem) => elem.local_name().as_ref() == PAD_BRANCH_CONTAINER.as_bytes(),
                _ => false,
            })
            .ok_or_else(|| RackError::TemplateCorruption(PAD_BRANCH_CONTAINER.to_string()))?;
        Ok(RackDocument { events, insert_at })
    }

    /// Appends a populated pad zone to the pad-branch container.
    pub fn append(&mut self, fragment: Fragment) {
        let count = fragment.events.len();
        self.events
            .splice(self.insert_at..self.insert_at, fragment.events);
        self.insert_at += count;
    }

    /// Serializes the document. The XML declaration is deliberately not
    /// emitted here; the container writer prepends the exact form Live
    /// expects.
    pub fn to_xml(&self) -> Result<String, RackError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for event in &self.events {
            writer.write_event(event.clone())?;
        }
        Ok(String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned())
    }
}

/// The local name of an element as an owned string.
fn local_name(elem: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(elem.local_name().as_ref()).into_owned()
}

/// Whether `ancestors` appear in `stack` in order (not necessarily
/// contiguously), i.e. an `.//A//B//field` style match.
fn contains_in_order(stack: &[String], ancestors: &[&str]) -> bool {
    let mut remaining = ancestors.iter();
    let mut next = remaining.next();
    for name in stack {
        match next {
            Some(ancestor) if name == ancestor => next = remaining.next(),
            Some(_) => {}
            None => break,
        }
    }
    next.is_none()
}

/// Rebuilds an element with the given attribute replaced (or appended when the
/// template omitted it), preserving all other attributes in order.
fn with_attribute(
    elem: &BytesStart<'_>,
    key: &str,
    value: &str,
) -> Result<BytesStart<'static>, RackError> {
    let mut updated = BytesStart::new(local_name(elem));
    let mut replaced = false;
    for attribute in elem.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_ref() == key.as_bytes() {
            updated.push_attribute((key, value));
            replaced = true;
        } else {
            let attr_key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let attr_value = String::from_utf8_lossy(&attribute.value).into_owned();
            updated.push_attribute((attr_key.as_str(), attr_value.as_str()));
        }
    }
    if !replaced {
        updated.push_attribute((key, value));
    }
    Ok(updated)
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::error::RackError;

    use super::{Fragment, RackDocument};

    #[test]
    fn test_fragment_set_first_only_touches_first() -> Result<(), Box<dyn Error>> {
        let mut fragment = Fragment::drum_branch()?;
        fragment.set_first(&["ZoneSettings"], "ReceivingNote", "87")?;

        let mut doc = RackDocument::new()?;
        doc.append(fragment);
        let xml = doc.to_xml()?;
        assert!(xml.contains(r#"<ReceivingNote Value="87"/>"#));
        Ok(())
    }

    #[test]
    fn test_fragment_sets_duplicated_fields_together() -> Result<(), Box<dyn Error>> {
        let mut fragment = Fragment::drum_branch()?;
        fragment.set_all(&[], "BrowserContentPath", "userfolder:X%5CY%5C#z:a.wav")?;
        fragment.set_all(&["SampleRef"], "OriginalFileSize", "4242")?;
        fragment.set_all(&["SampleRef", "FileRef"], "RelativePath", "../../../x")?;

        let mut doc = RackDocument::new()?;
        doc.append(fragment);
        let xml = doc.to_xml()?;
        assert_eq!(2, xml.matches(r#"Value="userfolder:X%5CY%5C#z:a.wav""#).count());
        assert_eq!(2, xml.matches(r#"<OriginalFileSize Value="4242"/>"#).count());
        assert_eq!(2, xml.matches(r#"<RelativePath Value="../../../x"/>"#).count());
        Ok(())
    }

    #[test]
    fn test_fragment_path_occurrences() -> Result<(), Box<dyn Error>> {
        let mut fragment = Fragment::drum_branch()?;
        fragment.set_occurrences(&["FileRef"], "Path", &[1, 2, 5], "C:\\a\\b\\c.wav")?;

        let mut doc = RackDocument::new()?;
        doc.append(fragment);
        let xml = doc.to_xml()?;
        // Three of the six Path fields carry the sample path, the other three
        // keep the template default.
        assert_eq!(3, xml.matches(r#"<Path Value="C:\a\b\c.wav"/>"#).count());
        assert_eq!(3, xml.matches(r#"<Path Value="" />"#).count());
        Ok(())
    }

    #[test]
    fn test_missing_field_is_template_corruption() -> Result<(), Box<dyn Error>> {
        let mut fragment = Fragment::drum_branch()?;
        assert!(matches!(
            fragment.set_first(&[], "NoSuchField", "1"),
            Err(RackError::TemplateCorruption(_))
        ));
        assert!(matches!(
            fragment.set_occurrences(&["FileRef"], "Path", &[1, 2, 99], "x"),
            Err(RackError::TemplateCorruption(_))
        ));
        Ok(())
    }

    #[test]
    fn test_root_attribute() -> Result<(), Box<dyn Error>> {
        let mut fragment = Fragment::drum_branch()?;
        fragment.set_root_attribute("Id", "92")?;

        let mut doc = RackDocument::new()?;
        doc.append(fragment);
        assert!(doc.to_xml()?.contains(r#"<DrumBranchPreset Id="92">"#));
        Ok(())
    }

    #[test]
    fn test_document_appends_in_order() -> Result<(), Box<dyn Error>> {
        let mut doc = RackDocument::new()?;
        for pad in [92, 91, 90] {
            let mut fragment = Fragment::drum_branch()?;
            fragment.set_root_attribute("Id", &pad.to_string())?;
            doc.append(fragment);
        }

        let xml = doc.to_xml()?;
        assert_eq!(3, xml.matches("<DrumBranchPreset").count());
        let first = xml.find(r#"<DrumBranchPreset Id="92">"#).expect("pad 92");
        let second = xml.find(r#"<DrumBranchPreset Id="91">"#).expect("pad 91");
        let third = xml.find(r#"<DrumBranchPreset Id="90">"#).expect("pad 90");
        assert!(first < second && second < third);
        // Everything lands inside the pad-branch container.
        let open = xml.find("<BranchPresets>").expect("container open");
        let close = xml.find("</BranchPresets>").expect("container close");
        assert!(open < first && third < close);
        Ok(())
    }

    #[test]
    fn test_empty_document_has_empty_container() -> Result<(), Box<dyn Error>> {
        let doc = RackDocument::new()?;
        let xml = doc.to_xml()?;
        assert!(xml.contains("<BranchPresets>"));
        assert!(!xml.contains("<DrumBranchPreset"));
        Ok(())
    }
}
