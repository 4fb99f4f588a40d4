//! Binary search tree collections for Rust.
//!
//! This crate provides [`BstMultimap`], an ordered container that permits
//! duplicate keys, plus two adapters built on top of it:
//!
//! - [`BstMap`] - a unique-key map with replace-on-insert semantics
//! - [`BstSet`] - a set of unique values
//!
//! All three store their entries in key order and expose bidirectional
//! in-order traversal through iterators and [`Cursor`]s.
//!
//! # Example
//!
//! ```
//! use twig_tree::BstMultimap;
//!
//! let mut visits = BstMultimap::new();
//! visits.insert(21, "first");
//! visits.insert(21, "second");
//! visits.insert(16, "only");
//!
//! // Duplicate keys are kept as distinct entries.
//! assert_eq!(visits.len(), 3);
//! assert_eq!(visits.equal_range(&21).count(), 2);
//!
//! // Removal is erase-all for a key.
//! assert_eq!(visits.remove_all(&21), 2);
//! assert_eq!(visits.len(), 1);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Multimap semantics** - Equal keys are stored as separate entries, kept
//!   adjacent in iteration order
//! - **Bidirectional cursors** - Step forward and backward through the in-order
//!   sequence from any found position
//!
//! # Implementation
//!
//! The tree is a plain, unbalanced binary search tree. Nodes live in an arena
//! of stable handles rather than individually boxed allocations, so parent
//! back-references are plain indices and teardown never recurses. Equal keys
//! are routed into the left subtree on insertion, which keeps duplicates
//! contiguous in the in-order sequence.
//!
//! No rebalancing is performed: a monotonically ordered insertion sequence
//! degrades the tree to a linked list with O(n) operations. Callers that need
//! guaranteed logarithmic behavior should reach for a balanced structure
//! instead.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code for the mutable value iterator.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod bst_map;
pub mod bst_multimap;
pub mod bst_set;

pub use bst_map::BstMap;
pub use bst_multimap::{BstMultimap, Cursor};
pub use bst_set::BstSet;
pub use error::Error;
