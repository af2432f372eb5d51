//! Markdown to sanitized HTML for section display

use anyhow::Result;
use log::debug;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::cache::{cache_key, CacheStats, CompileCache};
use crate::config::Config;
use crate::doc::Document;
use crate::mdx;
use crate::sanitize::{AllowListSanitizer, HtmlSanitizer};
use crate::sections::ContentSection;
use crate::security::{EventSource, SecurityEvent};
use crate::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Turn raw HTML blocks and inline HTML into text
    pub escape_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_raw_html: true,
        }
    }
}

/// Sanitized HTML for one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub html: String,
    pub events: Vec<SecurityEvent>,
}

/// Renders sections to HTML, memoizing output per section source
pub struct Renderer {
    options: RenderOptions,
    sanitizer: Box<dyn HtmlSanitizer>,
    cache: CompileCache<RenderedSection>,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self::with_sanitizer(
            RenderOptions {
                escape_raw_html: config.security.escape_raw_html,
            },
            Box::new(AllowListSanitizer::default()),
            config.cache.capacity,
        )
    }

    pub fn with_sanitizer(
        options: RenderOptions,
        sanitizer: Box<dyn HtmlSanitizer>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            options,
            sanitizer,
            cache: CompileCache::new(cache_capacity),
        }
    }

    /// Render a section of `doc`. Component sources have their import and
    /// export statements removed before rendering.
    pub fn render_section(
        &mut self,
        doc: &Document,
        section: &ContentSection,
    ) -> Result<RenderedSection> {
        let key = cache_key(&format!("{}/{}", doc.slug, section.slug), &section.body);
        let options = self.options;
        let sanitizer = self.sanitizer.as_ref();

        self.cache.get_or_compile(&key, || {
            debug!("rendering {}#{}", doc.slug, section.slug);
            let source = if doc.is_component_source {
                mdx::strip_statements(&section.body)
            } else {
                section.body.clone()
            };
            Ok(render_sanitized(&source, options, sanitizer))
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Render and sanitize `source`
pub fn render_sanitized(
    source: &str,
    options: RenderOptions,
    sanitizer: &dyn HtmlSanitizer,
) -> RenderedSection {
    let raw = render_markdown(source, options);
    let sanitized = sanitizer.sanitize(&raw);

    let mut events = Vec::new();
    if options.escape_raw_html && contains_raw_html(source) {
        events.push(SecurityEvent::info("Escaped raw HTML", EventSource::Renderer));
    }
    events.extend(sanitized.events);
    for event in &events {
        event.log();
    }

    RenderedSection {
        html: sanitized.html,
        events,
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn contains_raw_html(source: &str) -> bool {
    Parser::new_ext(source, markdown_options())
        .any(|event| matches!(event, Event::Html(_) | Event::InlineHtml(_)))
}

/// Markdown to unsanitized HTML.
///
/// Headings get slug ids and fenced code blocks get a language class plus a
/// copy button carrying the code.
pub fn render_markdown(source: &str, options: RenderOptions) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(String, String)> = None;
    let mut heading_start: Option<usize> = None;

    for event in Parser::new_ext(source, markdown_options()) {
        if code.is_some() {
            match event {
                Event::Text(text) => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buf)) = code.take() {
                        events.push(Event::Html(CowStr::from(code_block_html(&lang, &buf))));
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((lang, String::new()));
            }
            Event::Start(Tag::Heading { .. }) => {
                heading_start = Some(events.len());
                events.push(event);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(start) = heading_start.take() {
                    assign_heading_id(&mut events, start);
                }
                events.push(event);
            }
            Event::Html(raw) | Event::InlineHtml(raw) if options.escape_raw_html => {
                events.push(Event::Text(raw));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn assign_heading_id(events: &mut [Event<'_>], start: usize) {
    let text: String = events[start + 1..]
        .iter()
        .filter_map(|event| match event {
            Event::Text(t) | Event::Code(t) => Some(&**t),
            _ => None,
        })
        .collect();

    if let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(start) {
        if id.is_none() {
            *id = Some(CowStr::from(slugify(&text)));
        }
    }
}

fn code_block_html(lang: &str, code: &str) -> String {
    let lang: String = lang
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_' | '+'))
        .collect();
    let class = if lang.is_empty() {
        String::new()
    } else {
        format!(" class=\"language-{lang}\"")
    };

    format!(
        "<div class=\"code-block\"><button class=\"copy-button\" type=\"button\" data-copy=\"{}\">Copy</button><pre><code{}>{}</code></pre></div>\n",
        html_escape::encode_double_quoted_attribute(code),
        class,
        html_escape::encode_text(code),
    )
}
