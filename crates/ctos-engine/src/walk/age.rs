//! Fixed-width aging vector expansion.

use ctos_model::schema::AGE_BUCKETS;
use ctos_model::Field;
use roxmltree::Node;

use super::{elements, text_or};

/// Emit all seven aging buckets for `node` in canonical order, backfilling
/// absent (or empty) buckets with `sentinel`. Downstream consumers rely on
/// the vector always being exactly seven fields wide.
pub(crate) fn expand(node: Node, sentinel: &str, out: &mut Vec<Field>) {
    for bucket in AGE_BUCKETS.iter().copied() {
        let value = elements(node)
            .find(|child| matches_bucket(*child, bucket))
            .map(|child| text_or(child, sentinel))
            .unwrap_or_else(|| sentinel.to_string());
        out.push(Field::value(format!("age_{bucket}"), value));
    }
}

/// Bucket children are keyed by an explicit `name` attribute
/// (`<item name="30">`) or by trailing digits in the tag name
/// (`<aging30>`).
fn matches_bucket(child: Node, bucket: &str) -> bool {
    if let Some(name) = child.attribute("name") {
        return name.trim() == bucket;
    }
    trailing_digits(child.tag_name().name()) == Some(bucket)
}

fn trailing_digits(tag: &str) -> Option<&str> {
    let start = tag
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    Some(&tag[start..])
}
