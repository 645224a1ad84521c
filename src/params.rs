// Copyright 2026 `multipart-params` Crate Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Bracketed field names and the nested form tree they decode into.
//!
//! HTML forms flatten nested structure into the field name itself:
//! `Item[files][]` means "append to the `files` collection inside `Item`".
//! [`field_path`] turns such a name into an ordered key path, and
//! [`NodeMap::assign`] merges `(path, value)` pairs into one tree,
//! preserving the order fields appeared in the request body.

use std::mem;

/// A single node in a decoded form tree.
///
/// The same shape is used for text parameters (`Node<String>`) and for the
/// uploaded-file registry (`Node<UploadedFile>`); the two trees are built
/// from the same key paths and are structurally isomorphic.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<T> {
    /// A leaf value.
    Value(T),
    /// Nested keys, in first-occurrence order.
    Map(NodeMap<T>),
    /// An integer-indexed collection built by `[]` append keys.
    List(Vec<Node<T>>),
}

impl<T> Node<T> {
    /// Borrow this node as a leaf value, if it is one.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Node::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow this node as a nested map, if it is one.
    pub fn as_map(&self) -> Option<&NodeMap<T>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow this node as an appended collection, if it is one.
    pub fn as_list(&self) -> Option<&[Node<T>]> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    /// Build a fresh subtree holding `value` at the end of `path`.
    fn build(path: &[&str], value: T) -> Node<T> {
        match path.split_first() {
            None => Node::Value(value),
            Some((&"", rest)) => Node::List(vec![Node::build(rest, value)]),
            Some((&key, rest)) => {
                let mut map = NodeMap::new();
                map.entries.push((key.to_owned(), Node::build(rest, value)));
                Node::Map(map)
            }
        }
    }

    /// Merge `value` into an existing node at the remainder of a path.
    ///
    /// Collisions are resolved best-effort, never dropping what is already
    /// in the tree: scalars in the way are kept as the first child of the
    /// map that replaces them, and scalars landing on a container are
    /// appended as one more sibling inside it. Only an identical full path
    /// overwrites (the last occurrence of a repeated plain field wins, as
    /// native form decoding does).
    fn assign(&mut self, path: &[&str], value: T) {
        let (&key, rest) = match path.split_first() {
            Some(split) => split,
            None => {
                match self {
                    Node::Value(slot) => *slot = value,
                    Node::Map(map) => map.entries.push((String::new(), Node::Value(value))),
                    Node::List(list) => list.push(Node::Value(value)),
                }
                return;
            }
        };

        match self {
            Node::Value(_) => {
                // A structured key arrived after a plain one; keep the old
                // value as the first sibling under a fresh map.
                let old = mem::replace(self, Node::Map(NodeMap::new()));
                if let Node::Map(map) = self {
                    map.entries.push((String::new(), old));
                    map.assign(path, value);
                }
            }
            Node::Map(map) => map.assign(path, value),
            Node::List(list) => {
                if key.is_empty() {
                    list.push(Node::build(rest, value));
                } else {
                    // A named key under an appended collection opens a new
                    // keyed slot rather than reaching back into old ones.
                    let mut map = NodeMap::new();
                    map.entries.push((key.to_owned(), Node::build(rest, value)));
                    list.push(Node::Map(map));
                }
            }
        }
    }
}

/// An ordered mapping from field keys to [`Node`]s.
///
/// Sibling keys keep the order of their first occurrence in the body, so a
/// plain association list is the right storage; form payloads hold a
/// handful of fields and are scanned linearly.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMap<T> {
    entries: Vec<(String, Node<T>)>,
}

impl<T> Default for NodeMap<T> {
    fn default() -> Self {
        NodeMap::new()
    }
}

impl<T> NodeMap<T> {
    /// Create an empty map.
    pub fn new() -> NodeMap<T> {
        NodeMap { entries: Vec::new() }
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up the first entry under `key`.
    pub fn get(&self, key: &str) -> Option<&Node<T>> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, node)| node)
    }

    /// Iterate entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<T>)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node<T>> {
        self.entries
            .iter_mut()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, node)| node)
    }

    /// Insert `value` at `path`, creating intermediate levels as needed.
    ///
    /// An empty path is ignored; an empty key appends an anonymous sibling
    /// at that level (array semantics).
    pub fn assign(&mut self, path: &[&str], value: T) {
        let (&key, rest) = match path.split_first() {
            Some(split) => split,
            None => return,
        };

        if key.is_empty() {
            self.entries.push((String::new(), Node::build(rest, value)));
            return;
        }

        match self.get_mut(key) {
            Some(node) => node.assign(rest, value),
            None => self.entries.push((key.to_owned(), Node::build(rest, value))),
        }
    }
}

/// The decoded text parameters of a request body.
pub type Params = NodeMap<String>;

/// Resolve a bracketed field name into its ordered key path.
///
/// `title` becomes `["title"]`, `Item[name]` becomes `["Item", "name"]`,
/// and a trailing `[]` yields an empty key denoting array append. A name
/// with broken bracket syntax (unclosed or nested `[`) is kept whole as a
/// single plain key rather than guessed at.
pub fn field_path(name: &str) -> Vec<&str> {
    bracket_path(name).unwrap_or_else(|| vec![name])
}

fn bracket_path(name: &str) -> Option<Vec<&str>> {
    let open = name.find('[')?;
    let mut path = vec![&name[..open]];

    let mut rest = &name[open..];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let key = &inner[..close];
        if key.contains('[') {
            return None;
        }
        path.push(key);
        rest = &inner[close + 1..];
    }

    Some(path)
}

#[cfg(test)]
mod test {
    use super::{field_path, Node, NodeMap, Params};

    #[test]
    fn plain_name() {
        assert_eq!(field_path("title"), ["title"]);
    }

    #[test]
    fn nested_names() {
        assert_eq!(field_path("Item[name]"), ["Item", "name"]);
        assert_eq!(field_path("Item[files][]"), ["Item", "files", ""]);
        assert_eq!(field_path("a[b][c][d]"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn malformed_name_stays_whole() {
        assert_eq!(field_path("a[b"), ["a[b"]);
        assert_eq!(field_path("a[b]c"), ["a[b]c"]);
        assert_eq!(field_path("a[b[c]]"), ["a[b[c]]"]);
    }

    #[test]
    fn assign_scalar_and_nested() {
        let mut params = Params::new();
        params.assign(&field_path("title"), "test-title".to_owned());
        params.assign(&field_path("Item[name]"), "test-name".to_owned());

        assert_eq!(params.get("title").unwrap().as_value().unwrap(), "test-title");
        let item = params.get("Item").unwrap().as_map().unwrap();
        assert_eq!(item.get("name").unwrap().as_value().unwrap(), "test-name");
    }

    #[test]
    fn sibling_order_is_first_occurrence() {
        let mut params = Params::new();
        params.assign(&["b"], "1".to_owned());
        params.assign(&["a"], "2".to_owned());
        params.assign(&["c"], "3".to_owned());

        let keys: Vec<&str> = params.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn array_append() {
        let mut params = Params::new();
        params.assign(&field_path("tags[]"), "one".to_owned());
        params.assign(&field_path("tags[]"), "two".to_owned());

        let tags = params.get("tags").unwrap().as_list().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].as_value().unwrap(), "one");
        assert_eq!(tags[1].as_value().unwrap(), "two");
    }

    #[test]
    fn append_under_nested_key() {
        let mut params = Params::new();
        params.assign(&field_path("Item[files][]"), "f1".to_owned());
        params.assign(&field_path("Item[files][]"), "f2".to_owned());

        let item = params.get("Item").unwrap().as_map().unwrap();
        let files = item.get("files").unwrap().as_list().unwrap();
        assert_eq!(files[0].as_value().unwrap(), "f1");
        assert_eq!(files[1].as_value().unwrap(), "f2");
    }

    #[test]
    fn repeated_plain_field_takes_last_value() {
        let mut params = Params::new();
        params.assign(&["dup"], "first".to_owned());
        params.assign(&["dup"], "second".to_owned());

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("dup").unwrap().as_value().unwrap(), "second");
    }

    #[test]
    fn scalar_promoted_when_descended_through() {
        let mut params = Params::new();
        params.assign(&["a"], "plain".to_owned());
        params.assign(&["a", "b"], "nested".to_owned());

        let a = params.get("a").unwrap().as_map().unwrap();
        // The old scalar stays as the first child.
        let first = a.iter().next().unwrap();
        assert_eq!(first.0, "");
        assert_eq!(first.1.as_value().unwrap(), "plain");
        assert_eq!(a.get("b").unwrap().as_value().unwrap(), "nested");
    }

    #[test]
    fn scalar_onto_map_becomes_sibling() {
        let mut params = Params::new();
        params.assign(&["a", "b"], "nested".to_owned());
        params.assign(&["a"], "late".to_owned());

        let a = params.get("a").unwrap().as_map().unwrap();
        assert_eq!(a.get("b").unwrap().as_value().unwrap(), "nested");
        assert_eq!(a.get("").unwrap().as_value().unwrap(), "late");
    }

    #[test]
    fn append_slots_are_independent() {
        let mut params = Params::new();
        params.assign(&field_path("rows[][id]"), "1".to_owned());
        params.assign(&field_path("rows[][id]"), "2".to_owned());

        let rows = params.get("rows").unwrap().as_list().unwrap();
        assert_eq!(rows.len(), 2);
        match &rows[1] {
            Node::Map(map) => assert_eq!(map.get("id").unwrap().as_value().unwrap(), "2"),
            other => panic!("expected map slot, got {:?}", other),
        }
    }

    #[test]
    fn empty_map_reports_empty() {
        let map: NodeMap<String> = NodeMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
