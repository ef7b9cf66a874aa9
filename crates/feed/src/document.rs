// ABOUTME: Typed view of an RSS podcast document (RSS + iTunes + Podcast namespace).
// ABOUTME: Every repeatable node kind is a list, so normalizers never see single-vs-array shapes.

use crate::error::FeedError;
use crate::xml_tree::{parse_xml, Element};

/// An `<itunes:category>` node with its optional nested sub-category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryNode {
    pub text: Option<String>,
    pub subcategory: Option<Box<CategoryNode>>,
}

/// A `<podcast:person>` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonNode {
    pub name: Option<String>,
    pub role: Option<String>,
    pub group: Option<String>,
    pub href: Option<String>,
    pub img: Option<String>,
}

/// An `<enclosure>` node. Attributes are kept as raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnclosureNode {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub length: Option<String>,
}

/// `<itunes:owner>` contact details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerNode {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub guid: Option<String>,
    pub duration: Option<String>,
    pub episode: Option<String>,
    pub episode_type: Option<String>,
    pub explicit: Option<String>,
    pub image_href: Option<String>,
    pub enclosure: Option<EnclosureNode>,
    pub chapters_url: Option<String>,
    pub transcript_urls: Vec<String>,
    pub persons: Vec<PersonNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub language: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
    pub last_build_date: Option<String>,
    /// `<image><url>`.
    pub image_url: Option<String>,
    /// `<itunes:image href>`.
    pub itunes_image_href: Option<String>,
    pub author: Option<String>,
    pub itunes_type: Option<String>,
    pub explicit: Option<String>,
    pub summary: Option<String>,
    pub subtitle: Option<String>,
    pub podcast_guid: Option<String>,
    pub owner: Option<OwnerNode>,
    pub categories: Vec<CategoryNode>,
    pub persons: Vec<PersonNode>,
    pub items: Vec<ItemNode>,
}

/// A parsed `<rss><channel>` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedDocument {
    pub channel: ChannelNode,
}

impl FeedDocument {
    /// Parses raw feed bytes.
    pub fn parse(data: &[u8]) -> Result<Self, FeedError> {
        let root = parse_xml(data)?;
        Self::from_element(&root)
    }

    /// Builds the typed document from an element tree rooted at `<rss>`.
    pub fn from_element(root: &Element) -> Result<Self, FeedError> {
        if root.name != "rss" {
            return Err(FeedError::invalid(format!(
                "expected <rss> root element, found <{}>",
                root.name
            )));
        }
        let channel = root
            .child("channel")
            .ok_or_else(|| FeedError::invalid("<rss> has no <channel>"))?;

        Ok(Self {
            channel: channel_node(channel),
        })
    }
}

fn channel_node(el: &Element) -> ChannelNode {
    ChannelNode {
        title: el.child_text("title"),
        description: el.child_text("description"),
        link: el.child_text("link"),
        language: el.child_text("language"),
        generator: el.child_text("generator"),
        copyright: el.child_text("copyright"),
        last_build_date: el.child_text("lastBuildDate"),
        image_url: el.child("image").and_then(|img| img.child_text("url")),
        itunes_image_href: el.child_attr("itunes:image", "href"),
        author: el.child_text("itunes:author"),
        itunes_type: el.child_text("itunes:type"),
        explicit: el.child_text("itunes:explicit"),
        summary: el.child_text("itunes:summary"),
        subtitle: el.child_text("itunes:subtitle"),
        podcast_guid: el.child_text("podcast:guid"),
        owner: el.child("itunes:owner").map(|owner| OwnerNode {
            name: owner.child_text("itunes:name"),
            email: owner.child_text("itunes:email"),
        }),
        categories: el.children_named("itunes:category").map(category_node).collect(),
        persons: el.children_named("podcast:person").map(person_node).collect(),
        items: el.children_named("item").map(item_node).collect(),
    }
}

fn category_node(el: &Element) -> CategoryNode {
    CategoryNode {
        text: el.attr_value("text"),
        // Only one level of nesting is meaningful; the first nested node wins.
        subcategory: el
            .child("itunes:category")
            .map(|sub| Box::new(category_node(sub))),
    }
}

fn person_node(el: &Element) -> PersonNode {
    PersonNode {
        name: el.text_value(),
        role: el.attr_value("role"),
        group: el.attr_value("group"),
        href: el.attr_value("href"),
        img: el.attr_value("img"),
    }
}

fn item_node(el: &Element) -> ItemNode {
    ItemNode {
        title: el.child_text("title"),
        description: el.child_text("description"),
        link: el.child_text("link"),
        pub_date: el.child_text("pubDate"),
        guid: el.child_text("guid"),
        duration: el.child_text("itunes:duration"),
        episode: el.child_text("itunes:episode"),
        episode_type: el.child_text("itunes:episodeType"),
        explicit: el.child_text("itunes:explicit"),
        image_href: el.child_attr("itunes:image", "href"),
        enclosure: el.child("enclosure").map(|enc| EnclosureNode {
            url: enc.attr_value("url"),
            mime_type: enc.attr_value("type"),
            length: enc.attr_value("length"),
        }),
        chapters_url: el.child_attr("podcast:chapters", "url"),
        transcript_urls: el
            .children_named("podcast:transcript")
            .filter_map(|t| t.attr_value("url"))
            .collect(),
        persons: el.children_named("podcast:person").map(person_node).collect(),
    }
}
