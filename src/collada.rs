//! Wrap modes declared by a COLLADA document.
//!
//! Only `<effect id="Effect_<material>">` sections are read, and from each only
//! the first `<sampler2D>` with its `<wrap_s>` / `<wrap_t>` text. Elements are
//! matched by local name so documents with or without the COLLADA namespace
//! both work.

use std::fs;
use std::path::Path;

use roxmltree::Node;

use crate::error::ConfigError;
use crate::wrap_mode::{WrapMode, WrapPair};
use crate::wrap_table::WrapModeTable;

const EFFECT_PREFIX: &str = "Effect_";

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children().find(|c| is_element(c, name)).and_then(|c| c.text())
}

fn effect_wraps(effect: &Node) -> WrapPair {
    let Some(sampler) = effect.descendants().find(|n| is_element(n, "sampler2D")) else {
        return WrapPair::default();
    };
    WrapPair::new(
        WrapMode::from_document_text(child_text(&sampler, "wrap_s")),
        WrapMode::from_document_text(child_text(&sampler, "wrap_t")),
    )
}

pub fn wrap_table_from_document(document: &roxmltree::Document) -> WrapModeTable {
    let entries = document
        .descendants()
        .filter(|n| is_element(n, "effect"))
        .filter_map(|effect| {
            let Some(id) = effect.attribute("id") else {
                log::warn!("skipping effect without an id");
                return None;
            };
            let name = id.strip_prefix(EFFECT_PREFIX).unwrap_or(id);
            let wraps = effect_wraps(&effect);
            log::debug!("material '{}' wraps {}", name, wraps);
            Some((name.to_string(), wraps))
        });
    WrapModeTable::from_entries(entries)
}

pub fn parse_wrap_table(text: &str) -> Result<WrapModeTable, roxmltree::Error> {
    let document = roxmltree::Document::parse(text)?;
    Ok(wrap_table_from_document(&document))
}

pub fn load_wrap_table(path: &Path) -> Result<WrapModeTable, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            what: "DAE file",
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_wrap_table(&text).map_err(|source| ConfigError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "read wrap modes for {} materials from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}
