//! README transformation passes.
//!
//! A README goes through three steps before it is published:
//! 1. [`frontmatter::split`] separates the YAML front matter from the body
//! 2. [`exclude::remove_excluded_sections`] drops marked-out regions
//! 3. [`links::rewrite_image_links`] optionally makes relative images absolute

pub mod exclude;
pub mod frontmatter;
pub mod links;

pub use exclude::{ExcludedRegion, MarkerKind, TagMarker, remove_excluded_sections};
pub use frontmatter::{FrontMatter, split};
pub use links::{ImageReference, LinkBase, image_references, raw_base_url, rewrite_image_links};
