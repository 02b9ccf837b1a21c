//! Shared string table (`xl/sharedStrings.xml`)

use ahash::AHashMap;

use crate::xml::text_element;

/// Unique cell strings in first-use order
#[derive(Debug, Default)]
pub(crate) struct SharedStrings {
    strings: Vec<String>,
    index: AHashMap<String, u32>,
    /// Total number of references, written as `count`
    references: usize,
}

impl SharedStrings {
    /// Index of a string, adding it on first use
    pub(crate) fn add(&mut self, s: &str) -> u32 {
        self.references += 1;
        if let Some(&index) = self.index.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), index);
        index
    }

    pub(crate) fn unique_count(&self) -> usize {
        self.strings.len()
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        );
        for s in &self.strings {
            xml.push_str("<si>");
            xml.push_str(&text_element(s));
            xml.push_str("</si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_shared() {
        let mut sst = SharedStrings::default();
        assert_eq!(sst.add("alpha"), 0);
        assert_eq!(sst.add("beta"), 1);
        assert_eq!(sst.add("alpha"), 0);
        assert_eq!(sst.unique_count(), 2);

        let xml = sst.to_xml();
        assert!(xml.contains("count=\"3\" uniqueCount=\"2\""));
        assert!(xml.contains("<si><t>alpha</t></si><si><t>beta</t></si>"));
    }

    #[test]
    fn test_whitespace_and_control_characters() {
        let mut sst = SharedStrings::default();
        sst.add(" padded ");
        sst.add("bell\u{7}");
        let xml = sst.to_xml();
        assert!(xml.contains("<t xml:space=\"preserve\"> padded </t>"));
        assert!(xml.contains("<t>bell_x0007_</t>"));
    }
}
