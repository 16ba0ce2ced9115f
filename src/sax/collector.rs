//! SAX Collector
//!
//! Implements SaxHandler to collect owned events, merging adjacent
//! character data so the result does not depend on how input was split.

use super::events::SaxEvent;
use super::handler::SaxHandler;
use crate::core::attributes::Attribute;
use crate::error::Recovery;

/// Collector that gathers SAX events during reading
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SaxEvent>,
}

impl EventCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Iterate over the recoveries seen so far
    pub fn recoveries(&self) -> impl Iterator<Item = &Recovery> {
        self.events.iter().filter_map(|e| match e {
            SaxEvent::Recovered(issue) => Some(issue),
            _ => None,
        })
    }
}

impl SaxHandler for EventCollector {
    fn start_element(&mut self, name: &[u8], attrs: &[Attribute<'_>]) {
        self.events.push(SaxEvent::StartElement {
            name: String::from_utf8_lossy(name).into_owned(),
            attributes: attrs
                .iter()
                .map(|a| (a.name_lossy().into_owned(), a.value_lossy().into_owned()))
                .collect(),
        });
    }

    fn end_element(&mut self, name: &[u8]) {
        self.events.push(SaxEvent::EndElement {
            name: String::from_utf8_lossy(name).into_owned(),
        });
    }

    fn characters(&mut self, text: &[u8]) {
        let text = String::from_utf8_lossy(text);
        if let Some(SaxEvent::Characters(prev)) = self.events.last_mut() {
            prev.push_str(&text);
        } else {
            self.events.push(SaxEvent::Characters(text.into_owned()));
        }
    }

    fn recovered(&mut self, issue: Recovery) {
        self.events.push(SaxEvent::Recovered(issue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_collects_in_order() {
        let mut collector = EventCollector::new();
        let attrs = [Attribute::new(b"id", Cow::Borrowed(b"7"))];
        collector.start_element(b"item", &attrs);
        collector.characters(b"hi");
        collector.end_element(b"item");

        assert_eq!(
            collector.events(),
            &[
                SaxEvent::StartElement {
                    name: "item".to_string(),
                    attributes: vec![("id".to_string(), "7".to_string())],
                },
                SaxEvent::Characters("hi".to_string()),
                SaxEvent::EndElement { name: "item".to_string() },
            ]
        );
    }

    #[test]
    fn test_adjacent_characters_merged() {
        let mut collector = EventCollector::new();
        collector.characters(b"a");
        collector.characters(b"b");
        assert_eq!(collector.take_events(), vec![SaxEvent::Characters("ab".to_string())]);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn test_recoveries_filtered() {
        let mut collector = EventCollector::new();
        collector.recovered(Recovery::UnmatchedEndTag("x".to_string()));
        collector.end_element(b"x");
        assert_eq!(collector.recoveries().count(), 1);
        assert!(collector.events()[0].is_recovery());
        assert!(collector.events()[1].is_end_element());
    }
}
