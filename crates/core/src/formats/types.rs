use serde::Serialize;

use crate::command::Resolution;

/// The first format a link offers at a given resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatDescriptor {
    pub resolution: Resolution,
    pub format_id: String,
    /// `0.0` when the metadata omits it.
    pub fps: f64,
}

/// Resolution label to descriptor, in the order the metadata listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AvailableFormats {
    entries: Vec<FormatDescriptor>,
}

impl AvailableFormats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `descriptor` unless its resolution is already present.
    ///
    /// Returns whether it was recorded.
    pub fn insert(&mut self, descriptor: FormatDescriptor) -> bool {
        if self.contains(descriptor.resolution) {
            return false;
        }
        self.entries.push(descriptor);
        true
    }

    pub fn contains(&self, resolution: Resolution) -> bool {
        self.get(resolution).is_some()
    }

    pub fn get(&self, resolution: Resolution) -> Option<&FormatDescriptor> {
        self.entries.iter().find(|d| d.resolution == resolution)
    }

    /// Looks up by `WxH` label.
    pub fn get_label(&self, label: &str) -> Option<&FormatDescriptor> {
        self.entries.iter().find(|d| d.resolution.label() == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.resolution.label()).collect()
    }
}

impl<'a> IntoIterator for &'a AvailableFormats {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(resolution: Resolution, id: &str) -> FormatDescriptor {
        FormatDescriptor {
            resolution,
            format_id: id.to_string(),
            fps: 30.0,
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let mut formats = AvailableFormats::new();
        assert!(formats.insert(descriptor(Resolution::FullHd, "137")));
        assert!(!formats.insert(descriptor(Resolution::FullHd, "248")));
        assert_eq!(formats.len(), 1);
        assert_eq!(formats.get(Resolution::FullHd).unwrap().format_id, "137");
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut formats = AvailableFormats::new();
        formats.insert(descriptor(Resolution::Hd, "136"));
        formats.insert(descriptor(Resolution::Uhd4k, "313"));
        assert_eq!(formats.labels(), vec!["1280x720", "3840x2160"]);
        assert_eq!(formats.get_label("3840x2160").unwrap().format_id, "313");
        assert!(formats.get_label("640x360").is_none());
    }
}
