//! URL handling module for Alba-Harvest
//!
//! Detail ids come out of the `num=` query parameter, and image `src`
//! attributes (protocol-relative, root-relative or bare) are made absolute
//! against the site origin.

mod resolve;

pub use resolve::{ad_id_from_url, collapse_parent_segments, origin_of, resolve_asset_url};
