//! Page head synchronization.
//!
//! Every logical slot (a meta tag, the canonical link, the JSON-LD block) is
//! upserted by a stable key, so syncing is idempotent and a slot that a
//! descriptor omits keeps whatever value it had before.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::Seed;

pub const SITE_NAME: &str = "VulkanSeeds";
pub const STRUCTURED_DATA_MARKER: &str = "data-seed-structured";
const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttr {
    Name,
    Property,
}

impl MetaAttr {
    fn as_str(self) -> &'static str {
        match self {
            MetaAttr::Name => "name",
            MetaAttr::Property => "property",
        }
    }
}

/// Selector for one `<meta>` tag: `meta[{attr}="{key}"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaSlot {
    pub attr: MetaAttr,
    pub key: String,
}

impl MetaSlot {
    pub fn name(key: &str) -> Self {
        Self {
            attr: MetaAttr::Name,
            key: key.to_string(),
        }
    }

    pub fn property(key: &str) -> Self {
        Self {
            attr: MetaAttr::Property,
            key: key.to_string(),
        }
    }
}

/// Destination for head mutations. Implementations create a slot when it is
/// missing and overwrite it in place otherwise.
pub trait HeadSink {
    fn set_title(&mut self, title: &str);
    fn upsert_meta(&mut self, slot: MetaSlot, content: &str);
    fn upsert_canonical(&mut self, href: &str);
    fn upsert_structured_data(&mut self, data: &Value);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeoDescriptor {
    pub title: String,
    pub description: String,
    pub keywords: Option<Vec<String>>,
    pub image: Option<String>,
    pub canonical: Option<String>,
    pub structured: Option<Value>,
}

pub fn sync_head<H: HeadSink + ?Sized>(sink: &mut H, descriptor: &SeoDescriptor) {
    sink.set_title(&descriptor.title);

    sink.upsert_meta(MetaSlot::name("description"), &descriptor.description);
    if let Some(keywords) = &descriptor.keywords {
        sink.upsert_meta(MetaSlot::name("keywords"), &keywords.join(", "));
    }
    sink.upsert_meta(MetaSlot::property("og:title"), &descriptor.title);
    sink.upsert_meta(
        MetaSlot::property("og:description"),
        &descriptor.description,
    );
    if let Some(image) = &descriptor.image {
        sink.upsert_meta(MetaSlot::property("og:image"), image);
        sink.upsert_meta(MetaSlot::name("twitter:image"), image);
    }
    if let Some(canonical) = &descriptor.canonical {
        sink.upsert_canonical(canonical);
    }
    if let Some(structured) = &descriptor.structured {
        sink.upsert_structured_data(&with_schema_context(structured));
    }
}

fn with_schema_context(data: &Value) -> Value {
    let mut object = Map::new();
    object.insert("@context".to_string(), Value::String(SCHEMA_CONTEXT.to_string()));
    match data {
        Value::Object(fields) => {
            for (key, value) in fields {
                object.insert(key.clone(), value.clone());
            }
        }
        other => {
            object.insert("data".to_string(), other.clone());
        }
    }
    Value::Object(object)
}

pub fn site_default_descriptor(site_url: &str) -> SeoDescriptor {
    SeoDescriptor {
        title: "VulkanSeeds – Best Minecraft Seeds for Java & Bedrock Edition".to_string(),
        description: "Discover the best Minecraft seeds for Java Edition, Bedrock Edition, and MCPE. Find village spawn seeds, beautiful landscapes, and more. Copy instantly!".to_string(),
        keywords: Some(
            [
                "minecraft seeds",
                "java seeds",
                "bedrock seeds",
                "mcpe seeds",
                "village spawn seeds",
                "minecraft pe seeds",
                "best seeds",
                "seed finder",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
        ),
        image: None,
        canonical: Some(site_url.to_string()),
        structured: None,
    }
}

pub fn seed_descriptor(seed: &Seed, site_url: &str) -> SeoDescriptor {
    let description = if seed.description.is_empty() {
        format!(
            "Discover the {} minecraft seed. Perfect for {} edition.",
            seed.title, seed.version
        )
    } else {
        seed.description.clone()
    };
    SeoDescriptor {
        title: format!("{} - {SITE_NAME} | Best Minecraft Seed", seed.title),
        description,
        keywords: Some(vec![
            "minecraft seeds".to_string(),
            seed.title.to_lowercase(),
            seed.version.clone(),
            "seed finder".to_string(),
            "best seeds".to_string(),
        ]),
        image: seed.image_url.clone(),
        canonical: Some(format!("{site_url}/?seed={}", seed.id)),
        structured: Some(seed_structured_data(seed)),
    }
}

pub fn seed_structured_data(seed: &Seed) -> Value {
    json!({
        "@type": "Thing",
        "name": seed.title,
        "description": seed.description,
        "identifier": seed.seed_code,
        "properties": {
            "version": seed.version,
            "seedValue": seed.seed_code,
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeadTag {
    Meta { slot: MetaSlot, content: String },
    Canonical { href: String },
    StructuredData { json: String },
}

/// In-memory document head. Tags keep the order in which their slot was
/// first created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HtmlHead {
    title: String,
    tags: Vec<HeadTag>,
}

impl HtmlHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[HeadTag] {
        &self.tags
    }

    pub fn meta(&self, slot: &MetaSlot) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::Meta { slot: s, content } if s == slot => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn canonical(&self) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::Canonical { href } => Some(href.as_str()),
            _ => None,
        })
    }

    pub fn structured_data(&self) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::StructuredData { json } => Some(json.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!("<title>{}</title>", escape_text(&self.title))];
        for tag in &self.tags {
            let line = match tag {
                HeadTag::Meta { slot, content } => format!(
                    "<meta {}=\"{}\" content=\"{}\">",
                    slot.attr.as_str(),
                    escape_attr(&slot.key),
                    escape_attr(content)
                ),
                HeadTag::Canonical { href } => {
                    format!("<link rel=\"canonical\" href=\"{}\">", escape_attr(href))
                }
                HeadTag::StructuredData { json } => format!(
                    "<script type=\"application/ld+json\" {STRUCTURED_DATA_MARKER}=\"true\">{}</script>",
                    json.replace("</", "<\\/")
                ),
            };
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl HeadSink for HtmlHead {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn upsert_meta(&mut self, slot: MetaSlot, content: &str) {
        for tag in &mut self.tags {
            if let HeadTag::Meta { slot: s, content: c } = tag {
                if *s == slot {
                    *c = content.to_string();
                    return;
                }
            }
        }
        self.tags.push(HeadTag::Meta {
            slot,
            content: content.to_string(),
        });
    }

    fn upsert_canonical(&mut self, href: &str) {
        for tag in &mut self.tags {
            if let HeadTag::Canonical { href: h } = tag {
                *h = href.to_string();
                return;
            }
        }
        self.tags.push(HeadTag::Canonical {
            href: href.to_string(),
        });
    }

    fn upsert_structured_data(&mut self, data: &Value) {
        let rendered = data.to_string();
        for tag in &mut self.tags {
            if let HeadTag::StructuredData { json } = tag {
                *json = rendered;
                return;
            }
        }
        self.tags.push(HeadTag::StructuredData { json: rendered });
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_data_gets_schema_context_first() {
        let value = with_schema_context(&json!({"@type": "Thing", "name": "x"}));
        let rendered = value.to_string();
        assert!(rendered.starts_with("{\"@context\":\"https://schema.org\""));
        assert_eq!(value["name"], "x");
    }

    #[test]
    fn render_escapes_attribute_values() {
        let mut head = HtmlHead::new();
        head.set_title("A & B");
        head.upsert_meta(MetaSlot::name("description"), "say \"hi\" <now>");
        let html = head.render();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("content=\"say &quot;hi&quot; &lt;now&gt;\""));
    }

    #[test]
    fn meta_slots_distinguish_attribute_kind() {
        let mut head = HtmlHead::new();
        head.upsert_meta(MetaSlot::name("og:title"), "by name");
        head.upsert_meta(MetaSlot::property("og:title"), "by property");
        assert_eq!(head.tags().len(), 2);
        assert_eq!(head.meta(&MetaSlot::name("og:title")), Some("by name"));
    }
}
