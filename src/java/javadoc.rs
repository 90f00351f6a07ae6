/// Cleaned-up `/** ... */` comment: summary line plus block tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Javadoc {
    pub summary: Option<String>,
    pub tags: Vec<(String, String)>,
}

impl Javadoc {
    pub fn parse(raw: &str) -> Self {
        let body = raw
            .trim()
            .trim_start_matches("/**")
            .trim_end_matches("*/");
        let mut doc = Javadoc::default();
        for line in body.lines() {
            let line = line.trim().trim_start_matches('*').trim();
            if line.is_empty() {
                continue;
            }
            if let Some(tag) = line.strip_prefix('@') {
                let (name, value) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
                doc.tags.push((name.to_string(), value.trim().to_string()));
            } else if doc.summary.is_none() && doc.tags.is_empty() {
                doc.summary = Some(line.to_string());
            }
        }
        doc
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}
