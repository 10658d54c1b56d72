use std::collections::BTreeMap;
use std::fmt;

/// One gathered measurement: name, tags and numeric fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    measurement: &'static str,
    tags: BTreeMap<String, String>,
    fields: Vec<(&'static str, f64)>,
}

impl Sample {
    pub(crate) fn new(measurement: &'static str) -> Self {
        Self {
            measurement,
            tags: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    pub(crate) fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.insert(key.to_owned(), value.into());
        self
    }

    pub(crate) fn field(mut self, key: &'static str, value: f64) -> Self {
        self.fields.push((key, value));
        self
    }

    pub(crate) fn insert_tag(&mut self, key: &str, value: &str) {
        self.tags
            .entry(key.to_owned())
            .or_insert_with(|| value.to_owned());
    }

    /// Measurement name.
    #[must_use]
    pub fn measurement(&self) -> &str {
        self.measurement
    }

    /// Tags in key order.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Fields in gather order.
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, f64)] {
        &self.fields
    }
}

/// Renders `measurement,tag=value,... field=value,...`.
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.measurement)?;
        for (key, value) in &self.tags {
            write!(f, ",{key}={value}")?;
        }
        for (index, (key, value)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { ' ' } else { ',' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sorted_tags_then_fields() {
        let sample = Sample::new("mem")
            .tag("host", "h1")
            .tag("dc", "east")
            .field("total", 8.0)
            .field("used_percent", 12.5);
        assert_eq!(sample.to_string(), "mem,dc=east,host=h1 total=8,used_percent=12.5");
    }

    #[test]
    fn inserted_tags_do_not_override_plugin_tags() {
        let mut sample = Sample::new("cpu").tag("cpu", "cpu0");
        sample.insert_tag("cpu", "global");
        sample.insert_tag("host", "h1");
        assert_eq!(sample.to_string(), "cpu,cpu=cpu0,host=h1");
    }
}
